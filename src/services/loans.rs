//! Borrow and return lifecycle

use chrono::Utc;

use crate::{
    config::BorrowingConfig,
    error::{AppError, AppResult},
    models::{Borrowing, UserClaims},
    repository::{BorrowBatch, Repository},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: BorrowingConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: BorrowingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow books on behalf of the caller.
    ///
    /// The batch is all or nothing: if one book is missing or out of stock
    /// none of the requested books are lent.
    pub async fn borrow_books(
        &self,
        caller: &UserClaims,
        user_id: i32,
        book_ids: Vec<i32>,
    ) -> AppResult<Vec<Borrowing>> {
        caller.require_self(user_id, "borrow books")?;

        self.repository.users.get_by_id(user_id).await?;

        if book_ids.is_empty() {
            return Err(AppError::BadRequest("Book IDs cannot be empty".to_string()));
        }

        let active = self.repository.borrowings.count_active(user_id).await?;
        let requested = book_ids.len() as i64;
        if active + requested > self.config.max_active {
            return Err(AppError::BorrowLimitExceeded {
                active,
                requested,
                max: self.config.max_active,
            });
        }

        let now = Utc::now();
        let batch = BorrowBatch {
            user_id,
            book_ids,
            max_active: self.config.max_active,
            borrowed_at: now,
            due_date: Borrowing::due_date_for(now, self.config.loan_days),
        };

        let borrowings = self.repository.borrowings.borrow_books(&batch).await?;
        tracing::info!(
            user_id,
            count = borrowings.len(),
            due_date = %batch.due_date,
            "Books borrowed"
        );
        Ok(borrowings)
    }

    /// Return books held by the caller; an empty list returns all of them.
    /// Books the caller does not hold are skipped.
    pub async fn return_books(
        &self,
        caller: &UserClaims,
        user_id: i32,
        book_ids: Vec<i32>,
    ) -> AppResult<u64> {
        caller.require_self(user_id, "return books")?;

        let book_ids = if book_ids.is_empty() {
            self.repository
                .borrowings
                .active_for_user(user_id)
                .await?
                .into_iter()
                .map(|b| b.book_id)
                .collect()
        } else {
            book_ids
        };

        if book_ids.is_empty() {
            return Ok(0);
        }

        let returned = self
            .repository
            .borrowings
            .return_books(user_id, &book_ids, self.config.purge_returned)
            .await?;
        tracing::info!(user_id, returned, "Books returned");
        Ok(returned)
    }

    /// Return every overdue borrowing. Used by the background sweeper.
    pub async fn return_overdue(&self) -> AppResult<usize> {
        let reclaimed = self.repository.borrowings.return_overdue(Utc::now()).await?;

        for borrowing in &reclaimed {
            tracing::debug!(
                borrowing_id = borrowing.id,
                user_id = borrowing.user_id,
                book_id = borrowing.book_id,
                due_date = %borrowing.due_date,
                "Overdue borrowing returned"
            );
        }
        Ok(reclaimed.len())
    }
}
