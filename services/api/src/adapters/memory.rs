//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of both store ports. It mirrors the
//! behaviour of the PostgreSQL adapter (unique usernames, foreign keys,
//! zero-row updates) and is used when no database is configured. In that
//! case it starts from the same rows the SQL migrations seed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use inventory_core::domain::{Category, Item, ItemDetails, NewItem, Supplier, User, UserCredentials};
use inventory_core::ports::{CredentialStore, InventoryStore, PortError, PortResult};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, UserCredentials>,
    categories: BTreeMap<i32, Category>,
    suppliers: BTreeMap<i32, Supplier>,
    items: BTreeMap<i32, Item>,
    last_user_id: i32,
    last_category_id: i32,
    last_supplier_id: i32,
    last_item_id: i32,
}

impl Tables {
    fn details(&self, item: &Item) -> PortResult<ItemDetails> {
        let category = self.categories.get(&item.category_id).cloned().ok_or_else(|| {
            PortError::Unexpected(format!("Item {} references a missing category", item.id))
        })?;
        let supplier = self.suppliers.get(&item.supplier_id).cloned().ok_or_else(|| {
            PortError::Unexpected(format!("Item {} references a missing supplier", item.id))
        })?;
        Ok(ItemDetails {
            item: item.clone(),
            category,
            supplier,
        })
    }

    fn check_references(&self, item: &NewItem) -> PortResult<()> {
        if !self.categories.contains_key(&item.category_id) {
            return Err(PortError::Conflict(format!(
                "category {} does not exist",
                item.category_id
            )));
        }
        if !self.suppliers.contains_key(&item.supplier_id) {
            return Err(PortError::Conflict(format!(
                "supplier {} does not exist",
                item.supplier_id
            )));
        }
        Ok(())
    }
}

/// A store that keeps everything in memory behind a single lock.
/// Each port call takes the lock once, so every write is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the rows the migrations seed: the legacy `admin` and
    /// `user` accounts (clear-text secrets, upgraded on first login) plus one
    /// category and one supplier.
    pub async fn seeded() -> PortResult<Self> {
        let store = Self::new();
        store.create_user("admin", "adminpassword", "Admin").await?;
        store.create_user("user", "userpassword", "User").await?;
        store.add_category("General").await;
        store.add_supplier("Default Supplier", "").await;
        Ok(store)
    }

    pub async fn add_category(&self, name: &str) -> Category {
        let mut tables = self.tables.write().await;
        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        category
    }

    pub async fn add_supplier(&self, name: &str, contact_info: &str) -> Supplier {
        let mut tables = self.tables.write().await;
        tables.last_supplier_id += 1;
        let supplier = Supplier {
            id: tables.last_supplier_id,
            name: name.to_string(),
            contact_info: contact_info.to_string(),
        };
        tables.suppliers.insert(supplier.id, supplier.clone());
        supplier
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, secret: &str, role: &str) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(PortError::Conflict(format!("username {username} is taken")));
        }
        tables.last_user_id += 1;
        let credentials = UserCredentials {
            id: tables.last_user_id,
            username: username.to_string(),
            secret: secret.to_string(),
            role: role.to_string(),
        };
        tables.users.insert(credentials.id, credentials.clone());
        Ok(credentials.into_user())
    }

    async fn update_user_secret(&self, user_id: i32, secret: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.secret = secret.to_string();
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn get_category(&self, category_id: i32) -> PortResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&category_id).cloned())
    }

    async fn get_supplier(&self, supplier_id: i32) -> PortResult<Option<Supplier>> {
        Ok(self.tables.read().await.suppliers.get(&supplier_id).cloned())
    }

    async fn list_items(&self) -> PortResult<Vec<ItemDetails>> {
        let tables = self.tables.read().await;
        tables.items.values().map(|item| tables.details(item)).collect()
    }

    async fn get_item(&self, item_id: i32) -> PortResult<Option<ItemDetails>> {
        let tables = self.tables.read().await;
        tables
            .items
            .get(&item_id)
            .map(|item| tables.details(item))
            .transpose()
    }

    async fn item_exists(&self, item_id: i32) -> PortResult<bool> {
        Ok(self.tables.read().await.items.contains_key(&item_id))
    }

    async fn insert_item(&self, item: &NewItem) -> PortResult<Item> {
        let mut tables = self.tables.write().await;
        tables.check_references(item)?;
        tables.last_item_id += 1;
        let stored = Item::from_new(tables.last_item_id, item.clone());
        tables.items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn replace_item(&self, item_id: i32, item: &NewItem) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_references(item)?;
        match tables.items.get_mut(&item_id) {
            Some(existing) => {
                *existing = Item::from_new(item_id, item.clone());
                Ok(())
            }
            None => Err(PortError::Concurrency(format!(
                "update of item {} affected no rows",
                item_id
            ))),
        }
    }

    async fn delete_item(&self, item_id: i32) -> PortResult<bool> {
        Ok(self.tables.write().await.items.remove(&item_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(category_id: i32, supplier_id: i32) -> NewItem {
        NewItem {
            name: "Widget".to_string(),
            description: None,
            quantity: 3,
            price: 1.25,
            category_id,
            supplier_id,
        }
    }

    #[tokio::test]
    async fn replace_of_missing_item_reports_concurrency() {
        let store = MemoryStore::new();
        let category = store.add_category("Parts").await;
        let supplier = store.add_supplier("Globex", "").await;

        let err = store
            .replace_item(9, &widget(category.id, supplier.id))
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::Concurrency(_)));
    }

    #[tokio::test]
    async fn insert_enforces_foreign_keys() {
        let store = MemoryStore::new();
        let category = store.add_category("Parts").await;

        let err = store.insert_item(&widget(category.id, 5)).await.unwrap_err();

        assert!(matches!(err, PortError::Conflict(_)));
        assert!(store.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeded_store_matches_the_migrations() {
        let store = MemoryStore::seeded().await.unwrap();

        let admin = store.find_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!((admin.id, admin.role.as_str()), (1, "Admin"));
        assert_eq!(admin.secret, "adminpassword");
        let user = store.find_user_by_username("user").await.unwrap().unwrap();
        assert_eq!(user.role, "User");

        assert_eq!(store.get_category(1).await.unwrap().unwrap().name, "General");
        assert_eq!(store.get_supplier(1).await.unwrap().unwrap().name, "Default Supplier");
        assert!(store.insert_item(&widget(1, 1)).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let store = MemoryStore::new();
        store.create_user("dave", "x", "User").await.unwrap();

        let err = store.create_user("dave", "y", "User").await.unwrap_err();

        assert!(matches!(err, PortError::Conflict(_)));
    }
}
