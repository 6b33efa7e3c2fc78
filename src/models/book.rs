//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Derived availability status of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Available,
    OutOfStock,
}

impl BookStatus {
    /// Status is derived from the availability counter, never stored.
    pub fn from_available(available_copies: i32) -> Self {
        if available_copies > 0 {
            BookStatus::Available
        } else {
            BookStatus::OutOfStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub genre: Option<String>,
    pub cover_image_url: Option<String>,
    pub pages: Option<i32>,
    pub summary: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn status(&self) -> BookStatus {
        BookStatus::from_available(self.available_copies)
    }
}

/// Short book representation embedded in request listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available_copies: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: String,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub genre: Option<String>,
    pub cover_image_url: Option<String>,
    pub pages: Option<i32>,
    pub summary: Option<String>,
    #[validate(range(min = 1, message = "A book must have at least one copy"))]
    pub total_copies: i32,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub genre: Option<String>,
    pub cover_image_url: Option<String>,
    pub pages: Option<i32>,
    pub summary: Option<String>,
    #[validate(range(min = 1, message = "A book must have at least one copy"))]
    pub total_copies: Option<i32>,
}

/// Book query parameters (catalog search)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub status: Option<BookStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Per-book inventory projection
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryEntry {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub borrowed_copies: i32,
    pub status: BookStatus,
}

/// Aggregated inventory summary across the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventorySummary {
    pub total_books: i64,
    pub available_books: i64,
    pub out_of_stock_books: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub borrowed_copies: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_derived_from_availability() {
        assert_eq!(BookStatus::from_available(3), BookStatus::Available);
        assert_eq!(BookStatus::from_available(0), BookStatus::OutOfStock);
    }
}
