//! crates/inventory_core/src/ports.rs
//!
//! Defines the storage contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store (PostgreSQL, in-memory, ...).

use async_trait::async_trait;
use crate::domain::{Category, Item, ItemDetails, NewItem, Supplier, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The store rejected a write because it clashes with existing data
    /// (unique or foreign-key constraint).
    #[error("Conflicting write: {0}")]
    Conflict(String),
    /// A write expected to touch an existing record touched none.
    #[error("Concurrent modification: {0}")]
    Concurrency(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup.
    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>>;

    /// Fails with `PortError::Conflict` when the username is already taken.
    async fn create_user(&self, username: &str, secret: &str, role: &str) -> PortResult<User>;

    async fn update_user_secret(&self, user_id: i32, secret: &str) -> PortResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // --- Reference data ---
    async fn get_category(&self, category_id: i32) -> PortResult<Option<Category>>;

    async fn get_supplier(&self, supplier_id: i32) -> PortResult<Option<Supplier>>;

    // --- Items ---
    /// All items, each with its category and supplier, ordered by id.
    async fn list_items(&self) -> PortResult<Vec<ItemDetails>>;

    async fn get_item(&self, item_id: i32) -> PortResult<Option<ItemDetails>>;

    async fn item_exists(&self, item_id: i32) -> PortResult<bool>;

    /// Inserts the item and returns it with its store-assigned id.
    async fn insert_item(&self, item: &NewItem) -> PortResult<Item>;

    /// Replaces every writable field of the item in one atomic write.
    ///
    /// Fails with `PortError::Concurrency` when no record was written.
    async fn replace_item(&self, item_id: i32, item: &NewItem) -> PortResult<()>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_item(&self, item_id: i32) -> PortResult<bool>;
}
