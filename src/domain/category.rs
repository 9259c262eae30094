//! Category Entity
//!
//! Categories are user-defined labels with a display position. Mangas are
//! attached to categories through assignment records.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};

/// A user-defined category for grouping library entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier; 0 means the store has not assigned one yet
    pub id: i64,
    /// Display name
    pub name: String,
    /// Zero-based display position, dense across all categories
    pub order: i64,
}

impl Category {
    pub fn new(id: i64, name: String, order: i64) -> Self {
        Self { id, name, order }
    }

    /// True while the category has not been persisted
    pub fn is_unsaved(&self) -> bool {
        self.id == 0
    }

    /// Checks the entity against domain rules before any write
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "category name must not be empty".to_string(),
            ));
        }
        if self.order < 0 {
            return Err(DomainError::InvalidInput(format!(
                "category order must be non-negative, got {}",
                self.order
            )));
        }
        Ok(())
    }
}

impl Entity for Category {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Read-only projection of a category plus its assigned-manga count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub order: i64,
    /// Number of mangas assigned to this category
    pub item_count: i64,
}

/// Join table entry binding one manga to one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub item_id: i64,
    pub category_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_creation() {
        let category = Category::new(1, "Reading".to_string(), 0);
        assert_eq!(category.id(), 1);
        assert_eq!(category.name, "Reading");
        assert_eq!(category.order, 0);
        assert!(!category.is_unsaved());
    }

    #[test]
    fn test_unsaved_category() {
        let category = Category::new(0, "Completed".to_string(), 3);
        assert!(category.is_unsaved());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let category = Category::new(0, "   ".to_string(), 0);
        assert!(matches!(
            category.validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_order() {
        let category = Category::new(0, "Plan to read".to_string(), -1);
        assert!(matches!(
            category.validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
