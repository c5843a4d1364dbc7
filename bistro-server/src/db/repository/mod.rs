//! Repository Module
//!
//! Provides persistence operations for SurrealDB tables.
//!
//! # ID Convention
//!
//! 全栈统一使用 "table:id" 格式。Record *targets* (the document a statement
//! operates on) are bound as `RecordId`; stored *reference fields* are bound
//! and compared as their "table:id" string form, matching how the models
//! serialize them on write.

// Catalog / accounts
pub mod menu_item;
pub mod user;

// Orders
pub mod order;

// Tables
pub mod dining_table;

// Delivery
pub mod delivery;
pub mod rider;

// Loyalty
pub mod loyalty;

// Re-exports
pub use delivery::DeliveryRepository;
pub use dining_table::DiningTableRepository;
pub use loyalty::LoyaltyRepository;
pub use menu_item::MenuItemRepository;
pub use order::OrderRepository;
pub use rider::RiderRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::{AppError, ErrorCode};
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string into a RecordId
    pub fn parse_id(&self, id: &str) -> RepoResult<surrealdb::RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
    }
}
