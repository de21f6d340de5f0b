//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub published_at: NaiveDate,
    /// Copies currently on the shelf
    pub available_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public catalog projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    #[serde(rename = "unitAvailable")]
    #[sqlx(rename = "available_quantity")]
    pub unit_available: i32,
}

/// Create book request (admin only)
///
/// Every field defaults when absent so that a missing field is reported as a
/// missing field rather than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub published_at: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Available quantity cannot be negative"))]
    pub available_quantity: i32,
}

impl CreateBook {
    /// True when one of the required fields is empty or zero
    pub fn has_missing_fields(&self) -> bool {
        self.title.trim().is_empty()
            || self.author.trim().is_empty()
            || self.published_at.is_none()
            || self.available_quantity == 0
    }
}

/// Partial book update (admin only); absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(custom(function = "not_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank", message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub published_at: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Available quantity cannot be negative"))]
    pub available_quantity: Option<i32>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.published_at.is_none()
            && self.available_quantity.is_none()
    }
}
