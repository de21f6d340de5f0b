//! Repository layer for database operations
//!
//! Each table is reached through a store trait so that the services can be
//! exercised against mocks; the PostgreSQL implementations live in the
//! submodules and own their transactions.

pub mod books;
pub mod borrowings;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookSummary, BorrowedBook, Borrowing, CreateBook, NewUser, UpdateBook, User},
};

/// A batch of books to lend to one user
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowBatch {
    pub user_id: i32,
    pub book_ids: Vec<i32>,
    /// Limit of simultaneously un-returned borrowings, re-checked under lock
    pub max_active: i64,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksStore: Send + Sync {
    /// Catalog projection of every book
    async fn list(&self) -> AppResult<Vec<BookSummary>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    /// Merge the provided fields onto the stored book
    async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<User>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// Return every active borrowing of the user, then delete the user, in
    /// one transaction. Returns the number of borrowings closed.
    async fn delete_with_returns(&self, id: i32) -> AppResult<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingsStore: Send + Sync {
    /// Number of un-returned borrowings held by the user
    async fn count_active(&self, user_id: i32) -> AppResult<i64>;

    async fn active_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowedBook>>;

    /// Lend every book of the batch, all or nothing
    async fn borrow_books(&self, batch: &BorrowBatch) -> AppResult<Vec<Borrowing>>;

    /// Close the user's most recent open borrowing of each book. Unknown or
    /// already returned books are skipped. All or nothing.
    async fn return_books(
        &self,
        user_id: i32,
        book_ids: &[i32],
        purge_returned: bool,
    ) -> AppResult<u64>;

    /// Close every borrowing due at or before `now`, in one transaction
    async fn return_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Borrowing>>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub books: Arc<dyn BooksStore>,
    pub users: Arc<dyn UsersStore>,
    pub borrowings: Arc<dyn BorrowingsStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            borrowings: Arc::new(borrowings::BorrowingsRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Assemble a repository from arbitrary store implementations
    pub fn from_stores(
        books: Arc<dyn BooksStore>,
        users: Arc<dyn UsersStore>,
        borrowings: Arc<dyn BorrowingsStore>,
    ) -> Self {
        Self {
            pool: None,
            books,
            users,
            borrowings,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
