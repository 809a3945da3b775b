//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::CategoryId, user::UserID};

/// The color given to categories created without one.
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// The icon given to categories created without one.
pub const DEFAULT_ICON: &str = "📁";

/// A validated, non-empty category name without surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::Validation("Category name cannot be empty".to_owned()))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Whether two names are the same when ignoring case.
    pub fn matches(&self, other: &CategoryName) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user defined group of transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserID,
    /// The display name, unique per user ignoring case.
    pub name: CategoryName,
    /// A display color token, e.g. "#3B82F6".
    pub color: String,
    /// A display icon token, e.g. "🍔".
    pub icon: String,
    /// When the category was created.
    pub created_at: OffsetDateTime,
}

/// The fields needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The display name, unique per user ignoring case.
    pub name: CategoryName,
    /// A display color token, e.g. "#3B82F6".
    pub color: String,
    /// A display icon token, e.g. "🍔".
    pub icon: String,
}

/// A partial update of a category, `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<CategoryName>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryUpdate {
    /// Apply the update to `category`.
    pub fn apply(self, mut category: Category) -> Category {
        if let Some(name) = self.name {
            category.name = name;
        }

        if let Some(color) = self.color {
            category.color = color;
        }

        if let Some(icon) = self.icon {
            category.icon = icon;
        }

        category
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert!(matches!(category_name, Err(Error::Validation(_))));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert!(matches!(category_name, Err(Error::Validation(_))));
    }

    #[test]
    fn new_trims_whitespace() {
        let category_name = CategoryName::new("  Food \n").unwrap();

        assert_eq!(category_name.as_ref(), "Food");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("🔥");

        assert!(category_name.is_ok())
    }

    #[test]
    fn matches_ignores_case() {
        let name = CategoryName::new_unchecked("Food");

        assert!(name.matches(&CategoryName::new_unchecked("fOOD")));
        assert!(!name.matches(&CategoryName::new_unchecked("Foods")));
    }
}
