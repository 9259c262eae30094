//! Manga Category Store
//!
//! Persistence core for user-defined categories and their many-to-many
//! assignment to library entries ("mangas").
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//!
//! Reads are served as live snapshots: a subscriber always holds the latest
//! materialized result and is refreshed whenever a write touches the tables
//! the query depends on. Writes are async completion signals.

pub mod domain;
pub mod repository;

pub use domain::{Category, CategoryAssignment, CategoryWithCount, DomainError, DomainResult};
pub use repository::{
    init_db, CategoryAssignmentOperations, CategoryRepository, SqliteCategoryRepository, Store,
    Table,
};
