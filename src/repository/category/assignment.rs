//! Manga-Category Assignment Operations
//!
//! Operations for the many-to-many relationship between mangas and
//! categories. Replacing the category set for a batch of mangas is a
//! delete-then-insert pair inside one transaction; readers never observe the
//! intermediate state.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter};
use tokio::sync::watch;

use crate::domain::{Category, CategoryAssignment, DomainResult};
use crate::repository::db::{db_err, Table};

use super::category_repo::{not_initialized, sql_placeholders, SqliteCategoryRepository};
use super::mapper::row_to_category;
use super::observe::live_query;

/// Categories one manga is assigned to, in display order
const CATEGORIES_FOR_MANGA_SQL: &str = "\
SELECT c.id, c.name, c.\"order\"
 FROM categories c
 JOIN category_assignments ca ON ca.category_id = c.id
 WHERE ca.item_id = ?1
 ORDER BY c.\"order\" ASC";

/// Trait for manga-category assignment operations
#[async_trait]
pub trait CategoryAssignmentOperations {
    /// Categories the given manga is assigned to, as a live stream; every
    /// call gets an independent subscription
    async fn get_categories_for_manga(
        &self,
        item_id: i64,
    ) -> DomainResult<watch::Receiver<Vec<Category>>>;

    /// Replace the category set for every given manga. Existing assignments
    /// for those mangas are deleted and the |mangas| x |categories| cross
    /// product inserted, all in one transaction.
    async fn set_categories_for_mangas(
        &self,
        category_ids: &[i64],
        item_ids: &[i64],
    ) -> DomainResult<()>;

    /// Remove all category assignments for the given mangas
    async fn delete_categories_for_mangas(&self, item_ids: &[i64]) -> DomainResult<()>;
}

#[async_trait]
impl CategoryAssignmentOperations for SqliteCategoryRepository {
    async fn get_categories_for_manga(
        &self,
        item_id: i64,
    ) -> DomainResult<watch::Receiver<Vec<Category>>> {
        live_query(
            &self.store,
            &[Table::Categories, Table::CategoryAssignments],
            move |conn| {
                let mut stmt = conn.prepare(CATEGORIES_FOR_MANGA_SQL).map_err(db_err)?;
                let mut rows = stmt.query(params![item_id]).map_err(db_err)?;
                let mut categories = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    categories.push(row_to_category(row)?);
                }
                Ok(categories)
            },
        )
        .await
    }

    async fn set_categories_for_mangas(
        &self,
        category_ids: &[i64],
        item_ids: &[i64],
    ) -> DomainResult<()> {
        if item_ids.is_empty() {
            return Ok(());
        }
        // Cross product: one assignment per (manga, category) pair; the
        // composite primary key collapses duplicate pairs
        let records: Vec<CategoryAssignment> = item_ids
            .iter()
            .flat_map(|&item_id| {
                category_ids.iter().map(move |&category_id| CategoryAssignment {
                    item_id,
                    category_id,
                })
            })
            .collect();

        {
            let mut guard = self.store.conn.lock().await;
            let conn = guard.as_mut().ok_or_else(not_initialized)?;

            // Dropping the transaction on any error path rolls both steps back
            let tx = conn.transaction().map_err(db_err)?;

            let delete_sql = format!(
                "DELETE FROM category_assignments WHERE item_id IN ({})",
                sql_placeholders(item_ids.len())
            );
            tx.execute(&delete_sql, params_from_iter(item_ids.iter()))
                .map_err(db_err)?;

            for record in &records {
                tx.execute(
                    "INSERT OR REPLACE INTO category_assignments (item_id, category_id)
                     VALUES (?1, ?2)",
                    params![record.item_id, record.category_id],
                )
                .map_err(db_err)?;
            }

            tx.commit().map_err(db_err)?;
        }
        self.store.notify(Table::CategoryAssignments);
        Ok(())
    }

    async fn delete_categories_for_mangas(&self, item_ids: &[i64]) -> DomainResult<()> {
        if item_ids.is_empty() {
            return Ok(());
        }
        let changed = {
            let guard = self.store.conn.lock().await;
            let conn = guard.as_ref().ok_or_else(not_initialized)?;
            let sql = format!(
                "DELETE FROM category_assignments WHERE item_id IN ({})",
                sql_placeholders(item_ids.len())
            );
            conn.execute(&sql, params_from_iter(item_ids.iter()))
                .map_err(db_err)?
        };
        if changed > 0 {
            self.store.notify(Table::CategoryAssignments);
        }
        Ok(())
    }
}
