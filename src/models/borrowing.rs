//! Borrowing (loan of one book to one user) model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Borrowing model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Borrowing {
    /// Due date of a borrowing created at `created_at`
    pub fn due_date_for(created_at: DateTime<Utc>, loan_days: i64) -> DateTime<Utc> {
        created_at + Duration::days(loan_days)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.returned && self.due_date <= now
    }
}

/// Active borrowing joined with its book, for profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedBook {
    pub borrowing_id: i32,
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub due_date: DateTime<Utc>,
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowRequest {
    #[serde(default)]
    pub book_ids: Vec<i32>,
}

/// Return request; an empty list returns every active borrowing
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReturnRequest {
    #[serde(default)]
    pub book_ids: Vec<i32>,
}
