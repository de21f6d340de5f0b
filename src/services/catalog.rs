//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookSummary, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if book.has_missing_fields() {
            return Err(AppError::BadRequest("Missing required fields".to_string()));
        }
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.books.create(&book).await
    }

    /// Merge the provided fields onto an existing book
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        let existing = self.repository.books.get_by_id(id).await?;

        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if update.is_empty() {
            return Ok(existing);
        }

        let book = self.repository.books.update(id, &update).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }
}
