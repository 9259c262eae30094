//! Category Write Strategies
//!
//! Operation-specific persistence rules. The default path replaces the whole
//! row; rename and reorder touch exactly one column and leave the rest of the
//! row as stored. Dispatch is by operation, never by inspecting the entity at
//! runtime.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::domain::{Category, DomainResult};
use crate::repository::db::db_err;

use super::mapper::category_write_values;

/// How a category mutation is written to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WriteStrategy {
    /// Full-row insert-or-replace keyed by id
    Replace,
    /// Update only the name column of the row matching id
    RenameOnly,
    /// Update only the "order" column of the row matching id
    OrderOnly,
}

impl WriteStrategy {
    /// Apply this strategy for one category; returns the affected-row count.
    ///
    /// Zero affected rows is not an error: rename/reorder against an unknown
    /// id must surface as success with no effect.
    pub(super) fn apply(self, conn: &Connection, category: &Category) -> DomainResult<usize> {
        match self {
            WriteStrategy::Replace => {
                let values = category_write_values(category);
                let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
                let placeholders: Vec<String> =
                    (1..=values.len()).map(|i| format!("?{}", i)).collect();
                // Column names are compile-time constants from the mapper,
                // never caller input
                let sql = format!(
                    "INSERT OR REPLACE INTO categories ({}) VALUES ({})",
                    columns.join(", "),
                    placeholders.join(", ")
                );
                let bind_values: Vec<Value> = values.into_iter().map(|(_, value)| value).collect();
                conn.execute(&sql, params_from_iter(bind_values)).map_err(db_err)
            }
            WriteStrategy::RenameOnly => conn
                .execute(
                    "UPDATE categories SET name = ?1 WHERE id = ?2",
                    params![category.name, category.id],
                )
                .map_err(db_err),
            WriteStrategy::OrderOnly => conn
                .execute(
                    "UPDATE categories SET \"order\" = ?1 WHERE id = ?2",
                    params![category.order, category.id],
                )
                .map_err(db_err),
        }
    }
}
