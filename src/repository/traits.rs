//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for category data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{Category, CategoryWithCount, DomainResult};

/// Core repository trait for category reads and writes
///
/// Reads return live snapshots: the receiver always holds the latest
/// materialized result and is refreshed whenever a write touches the tables
/// the query depends on. A late subscriber immediately observes the current
/// snapshot; a slow one only ever skips to the newest.
///
/// All write operations are async completion signals; a store failure
/// surfaces as the error of that future.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by position. One underlying subscription is
    /// shared by every caller of this method.
    async fn get_categories(&self) -> DomainResult<watch::Receiver<Vec<Category>>>;

    /// All categories with their assigned-manga counts; every call gets an
    /// independent stream
    async fn get_categories_with_count(
        &self,
    ) -> DomainResult<watch::Receiver<Vec<CategoryWithCount>>>;

    /// Find category by ID
    async fn get_category(&self, id: i64) -> DomainResult<Option<Category>>;

    /// Insert or replace a single category, keyed by its id
    async fn add_category(&self, category: &Category) -> DomainResult<()>;

    /// Insert or replace a batch of categories in one transaction
    async fn add_categories(&self, categories: &[Category]) -> DomainResult<()>;

    /// Create a new category; the store assigns its identifier
    async fn create_category(&self, name: &str, order: i64) -> DomainResult<()>;

    /// Update only the name of the category with the given id.
    /// An unknown id is success with no effect.
    async fn rename_category(&self, id: i64, new_name: &str) -> DomainResult<()>;

    /// Re-rank the given categories by their position in the slice; the
    /// resulting order values are dense and zero-based
    async fn reorder_categories(&self, categories: &[Category]) -> DomainResult<()>;

    /// Delete category by ID; its assignments are removed with it
    async fn delete_category(&self, id: i64) -> DomainResult<()>;

    /// Delete a batch of categories by ID
    async fn delete_categories(&self, ids: &[i64]) -> DomainResult<()>;
}
