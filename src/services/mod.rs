//! Business logic services

pub mod catalog;
pub mod loans;
pub mod sweeper;
pub mod users;

use crate::{
    config::{AuthConfig, BorrowingConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        borrowing_config: BorrowingConfig,
    ) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), borrowing_config),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers to build services over mocked stores

    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{
        models::{Book, User},
        repository::{MockBooksStore, MockBorrowingsStore, MockUsersStore, Repository},
    };

    pub fn repository(
        books: MockBooksStore,
        users: MockUsersStore,
        borrowings: MockBorrowingsStore,
    ) -> Repository {
        Repository::from_stores(Arc::new(books), Arc::new(users), Arc::new(borrowings))
    }

    pub fn user(id: i32, password_hash: &str, is_admin: bool) -> User {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id,
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: format!("user{}@example.com", id),
            password: password_hash.to_string(),
            referal: None,
            is_admin,
            created_at: created,
            updated_at: created,
        }
    }

    pub fn book(id: i32, available_quantity: i32) -> Book {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Book {
            id,
            title: format!("Book {}", id),
            author: "Anonymous".to_string(),
            published_at: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            available_quantity,
            created_at: created,
            updated_at: created,
        }
    }
}
