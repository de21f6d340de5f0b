//! Data models for the library

pub mod book;
pub mod borrowing;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookSummary, CreateBook, UpdateBook};
pub use borrowing::{BorrowedBook, Borrowing};
pub use user::{NewUser, User, UserClaims, UserProfile};
