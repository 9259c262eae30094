//! Category Repository Module
//!
//! This module provides category repository functionality split into specialized sub-modules:
//! - category_repo: Core CRUD operations and list reads
//! - assignment: Manga-category assignment operations
//! - mapper: Row-to-entity and entity-to-column conversions
//! - writes: Operation-specific write strategies
//! - observe: Live query streams and the shared list cache

mod assignment;
mod category_repo;
mod mapper;
mod observe;
mod writes;

pub use category_repo::SqliteCategoryRepository;

// Re-export the operation trait so it can be used by importing the repository
pub use assignment::CategoryAssignmentOperations;
