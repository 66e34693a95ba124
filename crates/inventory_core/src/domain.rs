//! crates/inventory_core/src/domain.rs
//!
//! Defines the pure, core data structures for the inventory backend.
//! These structs are independent of any database or serialization format.

/// Role assigned to accounts created through registration when the caller
/// does not ask for one.
pub const DEFAULT_ROLE: &str = "User";

// Represents a user - safe to hand back to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: String,
}

// Only used internally for login/registration - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i32,
    pub username: String,
    /// Either an argon2 PHC string or, for rows that predate hashing, the
    /// clear-text secret.
    pub secret: String,
    pub role: String,
}

impl UserCredentials {
    /// Drops the secret.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            role: self.role,
        }
    }
}

/// A grouping that items belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// A vendor that items are sourced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    pub contact_info: String,
}

/// The writable fields of an item. Used for both create and full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: i32,
    pub supplier_id: i32,
}

/// A stored stock item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: i32,
    pub supplier_id: i32,
}

impl Item {
    pub fn from_new(id: i32, new_item: NewItem) -> Self {
        Self {
            id,
            name: new_item.name,
            description: new_item.description,
            quantity: new_item.quantity,
            price: new_item.price,
            category_id: new_item.category_id,
            supplier_id: new_item.supplier_id,
        }
    }
}

/// An item together with the category and supplier it references.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub item: Item,
    pub category: Category,
    pub supplier: Supplier,
}
