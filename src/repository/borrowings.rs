//! Borrowings repository for database operations
//!
//! Book counts are only ever changed together with a borrowing row, inside
//! the same transaction, so decrements and increments stay paired.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::{BorrowBatch, BorrowingsStore};
use crate::{
    error::{AppError, AppResult},
    models::{BorrowedBook, Borrowing},
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Close the user's most recent open borrowing of each book and put the copy
/// back on the shelf. Books without an open borrowing are skipped.
///
/// Runs on the caller's transaction; shared by self-service returns and
/// account deletion.
pub(crate) async fn return_books_in_tx(
    conn: &mut PgConnection,
    user_id: i32,
    book_ids: &[i32],
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let mut returned = 0;

    for &book_id in book_ids {
        // The NOT returned guard on the outer UPDATE makes the flip happen once
        // even when a sweep closes the same row concurrently.
        let flipped: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE borrowings SET returned = TRUE, returned_at = $3
            WHERE id = (
                SELECT id FROM borrowings
                WHERE user_id = $1 AND book_id = $2 AND NOT returned
                ORDER BY created_at DESC, id DESC
                LIMIT 1
                FOR UPDATE
            )
            AND NOT returned
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(borrowing_id) = flipped else {
            tracing::debug!(user_id, book_id, "No open borrowing, skipping return");
            continue;
        };

        restock(&mut *conn, book_id, now).await?;
        tracing::debug!(user_id, book_id, borrowing_id, "Book returned");
        returned += 1;
    }

    Ok(returned)
}

/// Increment the available count of a book
async fn restock(conn: &mut PgConnection, book_id: i32, now: DateTime<Utc>) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE books SET available_quantity = available_quantity + 1, updated_at = $2 WHERE id = $1",
    )
    .bind(book_id)
    .bind(now)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Book not found".to_string()));
    }
    Ok(())
}

#[async_trait]
impl BorrowingsStore for BorrowingsRepository {
    async fn count_active(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE user_id = $1 AND NOT returned",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn active_for_user(&self, user_id: i32) -> AppResult<Vec<BorrowedBook>> {
        let books = sqlx::query_as::<_, BorrowedBook>(
            r#"
            SELECT br.id AS borrowing_id, b.id AS book_id, b.title, b.author, br.due_date
            FROM borrowings br
            JOIN books b ON b.id = br.book_id
            WHERE br.user_id = $1 AND NOT br.returned
            ORDER BY br.due_date, br.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn borrow_books(&self, batch: &BorrowBatch) -> AppResult<Vec<Borrowing>> {
        let mut tx = self.pool.begin().await?;

        // Locking the user row serializes concurrent borrows by the same user,
        // so the limit check below cannot be raced.
        sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(batch.user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE user_id = $1 AND NOT returned",
        )
        .bind(batch.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let requested = batch.book_ids.len() as i64;
        if active + requested > batch.max_active {
            return Err(AppError::BorrowLimitExceeded {
                active,
                requested,
                max: batch.max_active,
            });
        }

        // All requested books are locked in one statement, in id order, so two
        // batches naming the same books in different orders cannot deadlock.
        let mut available: HashMap<i32, i32> = sqlx::query_as::<_, (i32, i32)>(
            "SELECT id, available_quantity FROM books WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&batch.book_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let mut created = Vec::with_capacity(batch.book_ids.len());
        for &book_id in &batch.book_ids {
            let remaining = available
                .get_mut(&book_id)
                .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

            if *remaining <= 0 {
                return Err(AppError::BookNotAvailable(book_id));
            }
            *remaining -= 1;

            let borrowing = sqlx::query_as::<_, Borrowing>(
                r#"
                INSERT INTO borrowings (user_id, book_id, created_at, due_date, returned)
                VALUES ($1, $2, $3, $4, FALSE)
                RETURNING *
                "#,
            )
            .bind(batch.user_id)
            .bind(book_id)
            .bind(batch.borrowed_at)
            .bind(batch.due_date)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE books SET available_quantity = available_quantity - 1, updated_at = $2 WHERE id = $1",
            )
            .bind(book_id)
            .bind(batch.borrowed_at)
            .execute(&mut *tx)
            .await?;

            created.push(borrowing);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn return_books(
        &self,
        user_id: i32,
        book_ids: &[i32],
        purge_returned: bool,
    ) -> AppResult<u64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let returned = return_books_in_tx(&mut tx, user_id, book_ids, now).await?;

        if purge_returned {
            let purged = sqlx::query("DELETE FROM borrowings WHERE user_id = $1 AND returned")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            tracing::debug!(user_id, purged = purged.rows_affected(), "Purged returned borrowings");
        }

        tx.commit().await?;
        Ok(returned)
    }

    async fn return_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Borrowing>> {
        let mut tx = self.pool.begin().await?;

        let overdue = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings SET returned = TRUE, returned_at = $1
            WHERE due_date <= $1 AND NOT returned
            RETURNING *
            "#,
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        // One failing row aborts the whole pass; dropping `tx` rolls back.
        for borrowing in &overdue {
            restock(&mut tx, borrowing.book_id, now).await?;
        }

        tx.commit().await?;
        Ok(overdue)
    }
}
