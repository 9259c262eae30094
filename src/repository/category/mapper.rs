//! Row and Value Mapping
//!
//! Conversions between stored rows and domain entities, and from entities to
//! column/value pairs for writes. Pure transformations used by every read and
//! write path; a row that does not match the expected shape fails that single
//! read with a mapping error.

use rusqlite::types::Value;
use rusqlite::Row;

use crate::domain::{Category, CategoryWithCount, DomainError, DomainResult};

/// Convert a database row (id, name, "order") to a Category
pub(super) fn row_to_category(row: &Row) -> DomainResult<Category> {
    Ok(Category {
        id: row.get(0).map_err(mapping_err)?,
        name: row.get(1).map_err(mapping_err)?,
        order: row.get(2).map_err(mapping_err)?,
    })
}

/// Convert a database row (id, name, "order", item_count) to a CategoryWithCount
pub(super) fn row_to_category_with_count(row: &Row) -> DomainResult<CategoryWithCount> {
    Ok(CategoryWithCount {
        id: row.get(0).map_err(mapping_err)?,
        name: row.get(1).map_err(mapping_err)?,
        order: row.get(2).map_err(mapping_err)?,
        item_count: row.get(3).map_err(mapping_err)?,
    })
}

/// Column/value pairs for the default write path.
///
/// Omits `id` for an unsaved category so the store assigns one on insert.
pub(super) fn category_write_values(category: &Category) -> Vec<(&'static str, Value)> {
    let mut values = Vec::with_capacity(3);
    if !category.is_unsaved() {
        values.push(("id", Value::Integer(category.id)));
    }
    values.push(("name", Value::Text(category.name.clone())));
    values.push(("\"order\"", Value::Integer(category.order)));
    values
}

fn mapping_err(e: rusqlite::Error) -> DomainError {
    DomainError::Mapping(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_values_omit_id_for_unsaved() {
        let category = Category::new(0, "Action".to_string(), 0);
        let values = category_write_values(&category);
        assert!(values.iter().all(|(column, _)| *column != "id"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_write_values_include_id_when_persisted() {
        let category = Category::new(7, "Action".to_string(), 2);
        let values = category_write_values(&category);
        assert_eq!(values[0], ("id", Value::Integer(7)));
        assert_eq!(values.len(), 3);
    }
}
