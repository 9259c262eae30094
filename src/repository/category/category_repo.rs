//! Category Repository - Core Operations
//!
//! SQLite-backed implementation of the category contract. Assignment
//! operations are in the `assignment` module.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};
use tokio::sync::watch;

use crate::domain::{Category, CategoryWithCount, DomainError, DomainResult};
use crate::repository::db::{db_err, Store, Table};
use crate::repository::traits::CategoryRepository;

use super::mapper::{row_to_category, row_to_category_with_count};
use super::observe::{live_query, SharedLiveList};
use super::writes::WriteStrategy;

/// Ordered category list
const LIST_CATEGORIES_SQL: &str = "SELECT id, name, \"order\" FROM categories ORDER BY \"order\" ASC";

/// Aggregate join; LEFT JOIN so a category without assignments still appears
/// with a count of 0
const LIST_WITH_COUNT_SQL: &str = "\
SELECT c.id, c.name, c.\"order\", COUNT(ca.item_id) AS item_count
 FROM categories c
 LEFT JOIN category_assignments ca ON ca.category_id = c.id
 GROUP BY c.id, c.name, c.\"order\"
 ORDER BY c.\"order\" ASC";

const GET_CATEGORY_SQL: &str = "SELECT id, name, \"order\" FROM categories WHERE id = ?1";

/// SQLite implementation of the category repository
pub struct SqliteCategoryRepository {
    pub(super) store: Store,
    list_cache: SharedLiveList<Category>,
}

impl SqliteCategoryRepository {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            list_cache: SharedLiveList::new(),
        }
    }
}

/// Placeholder list for an `IN (...)` clause with `n` bound values
pub(super) fn sql_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Run a category list query and map every row
pub(super) fn collect_categories(conn: &Connection, sql: &str) -> DomainResult<Vec<Category>> {
    let mut stmt = conn.prepare(sql).map_err(db_err)?;
    let mut rows = stmt.query([]).map_err(db_err)?;
    let mut categories = Vec::new();
    while let Some(row) = rows.next().map_err(db_err)? {
        categories.push(row_to_category(row)?);
    }
    Ok(categories)
}

pub(super) fn not_initialized() -> DomainError {
    DomainError::Storage("Database not initialized".to_string())
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn get_categories(&self) -> DomainResult<watch::Receiver<Vec<Category>>> {
        self.list_cache
            .subscribe(&self.store, &[Table::Categories], |conn| {
                collect_categories(conn, LIST_CATEGORIES_SQL)
            })
            .await
    }

    async fn get_categories_with_count(
        &self,
    ) -> DomainResult<watch::Receiver<Vec<CategoryWithCount>>> {
        live_query(
            &self.store,
            &[Table::Categories, Table::CategoryAssignments],
            |conn| {
                let mut stmt = conn.prepare(LIST_WITH_COUNT_SQL).map_err(db_err)?;
                let mut rows = stmt.query([]).map_err(db_err)?;
                let mut categories = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    categories.push(row_to_category_with_count(row)?);
                }
                Ok(categories)
            },
        )
        .await
    }

    async fn get_category(&self, id: i64) -> DomainResult<Option<Category>> {
        let guard = self.store.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(GET_CATEGORY_SQL).map_err(db_err)?;
        let mut rows = stmt.query(params![id]).map_err(db_err)?;

        match rows.next().map_err(db_err)? {
            Some(row) => Ok(Some(row_to_category(row)?)),
            None => Ok(None),
        }
    }

    async fn add_category(&self, category: &Category) -> DomainResult<()> {
        category.validate()?;
        {
            let guard = self.store.conn.lock().await;
            let conn = guard.as_ref().ok_or_else(not_initialized)?;
            WriteStrategy::Replace.apply(conn, category)?;
        }
        self.store.notify(Table::Categories);
        Ok(())
    }

    async fn add_categories(&self, categories: &[Category]) -> DomainResult<()> {
        if categories.is_empty() {
            return Ok(());
        }
        for category in categories {
            category.validate()?;
        }
        {
            let mut guard = self.store.conn.lock().await;
            let conn = guard.as_mut().ok_or_else(not_initialized)?;
            let tx = conn.transaction().map_err(db_err)?;
            for category in categories {
                WriteStrategy::Replace.apply(&tx, category)?;
            }
            tx.commit().map_err(db_err)?;
        }
        self.store.notify(Table::Categories);
        Ok(())
    }

    async fn create_category(&self, name: &str, order: i64) -> DomainResult<()> {
        // The store assigns the id on insert
        let category = Category::new(0, name.to_string(), order);
        self.add_category(&category).await
    }

    async fn rename_category(&self, id: i64, new_name: &str) -> DomainResult<()> {
        let category = Category::new(id, new_name.to_string(), 0);
        category.validate()?;

        let changed = {
            let guard = self.store.conn.lock().await;
            let conn = guard.as_ref().ok_or_else(not_initialized)?;
            WriteStrategy::RenameOnly.apply(conn, &category)?
        };
        if changed > 0 {
            self.store.notify(Table::Categories);
        } else {
            log::debug!("rename_category: no row with id {}", id);
        }
        Ok(())
    }

    async fn reorder_categories(&self, categories: &[Category]) -> DomainResult<()> {
        let changed = {
            let mut guard = self.store.conn.lock().await;
            let conn = guard.as_mut().ok_or_else(not_initialized)?;
            let tx = conn.transaction().map_err(db_err)?;
            let mut changed = 0;
            // Position in the input sequence defines the new rank, whatever
            // order value the caller left on the entity
            for (position, category) in categories.iter().enumerate() {
                let ranked = Category {
                    order: position as i64,
                    ..category.clone()
                };
                changed += WriteStrategy::OrderOnly.apply(&tx, &ranked)?;
            }
            tx.commit().map_err(db_err)?;
            changed
        };
        if changed > 0 {
            self.store.notify(Table::Categories);
        }
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> DomainResult<()> {
        let changed = {
            let guard = self.store.conn.lock().await;
            let conn = guard.as_ref().ok_or_else(not_initialized)?;
            conn.execute("DELETE FROM categories WHERE id = ?1", params![id])
                .map_err(db_err)?
        };
        if changed > 0 {
            // CASCADE removed the category's assignments as well
            self.store.notify(Table::Categories);
            self.store.notify(Table::CategoryAssignments);
        }
        Ok(())
    }

    async fn delete_categories(&self, ids: &[i64]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let changed = {
            let guard = self.store.conn.lock().await;
            let conn = guard.as_ref().ok_or_else(not_initialized)?;
            let sql = format!(
                "DELETE FROM categories WHERE id IN ({})",
                sql_placeholders(ids.len())
            );
            conn.execute(&sql, params_from_iter(ids.iter()))
                .map_err(db_err)?
        };
        if changed > 0 {
            self.store.notify(Table::Categories);
            self.store.notify(Table::CategoryAssignments);
        }
        Ok(())
    }
}
