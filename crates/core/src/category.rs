//! Product categories.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Catalog domain a product belongs to.
///
/// Product ids are only unique within a category, so the category is part of
/// cart line identity. The wire form everywhere (cart, orders, comments) is
/// the lowercase plural string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Books,
    Clothes,
    Phones,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Books, Category::Clothes, Category::Phones];

    /// Wire string ("books", "clothes", "phones").
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Books => "books",
            Category::Clothes => "clothes",
            Category::Phones => "phones",
        }
    }

    /// URL prefix of the catalog service that owns this category.
    ///
    /// The services are mounted under singular prefixes for books and
    /// phones (`/book/api/books/`, `/phone/api/phones/`) but a plural one
    /// for clothes (`/clothes/api/clothes/`).
    pub fn service_prefix(&self) -> &'static str {
        match self {
            Category::Books => "book",
            Category::Clothes => "clothes",
            Category::Phones => "phone",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Accepts the wire strings plus their singular forms (CLI input).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "books" | "book" => Ok(Category::Books),
            "clothes" => Ok(Category::Clothes),
            "phones" | "phone" => Ok(Category::Phones),
            other => Err(DomainError::UnknownCategory(other.to_string())),
        }
    }
}
