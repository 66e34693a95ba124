//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CredentialStore` and `InventoryStore` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use inventory_core::domain::{Category, Item, ItemDetails, NewItem, Supplier, User, UserCredentials};
use inventory_core::ports::{CredentialStore, InventoryStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps constraint violations to `Conflict` and everything else to `Unexpected`.
fn map_write_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() =>
        {
            PortError::Conflict(db.message().to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn map_read_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i32,
    username: String,
    secret: String,
    role: String,
}
impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            secret: self.secret,
            role: self.role,
        }
    }
}

#[derive(FromRow)]
struct CategoryRecord {
    id: i32,
    name: String,
}
impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct SupplierRecord {
    id: i32,
    name: String,
    contact_info: String,
}
impl SupplierRecord {
    fn to_domain(self) -> Supplier {
        Supplier {
            id: self.id,
            name: self.name,
            contact_info: self.contact_info,
        }
    }
}

#[derive(FromRow)]
struct ItemRecord {
    id: i32,
    name: String,
    description: Option<String>,
    quantity: i32,
    price: f64,
    category_id: i32,
    supplier_id: i32,
}
impl ItemRecord {
    fn to_domain(self) -> Item {
        Item {
            id: self.id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
        }
    }
}

/// One row of the items/categories/suppliers join.
#[derive(FromRow)]
struct ItemDetailsRecord {
    #[sqlx(flatten)]
    item: ItemRecord,
    category_name: String,
    supplier_name: String,
    supplier_contact_info: String,
}
impl ItemDetailsRecord {
    fn to_domain(self) -> ItemDetails {
        let category = Category {
            id: self.item.category_id,
            name: self.category_name,
        };
        let supplier = Supplier {
            id: self.item.supplier_id,
            name: self.supplier_name,
            contact_info: self.supplier_contact_info,
        };
        ItemDetails {
            item: self.item.to_domain(),
            category,
            supplier,
        }
    }
}

const ITEM_DETAILS_SELECT: &str = "\
    SELECT i.id, i.name, i.description, i.quantity, i.price, i.category_id, i.supplier_id, \
           c.name AS category_name, s.name AS supplier_name, s.contact_info AS supplier_contact_info \
    FROM items i \
    JOIN categories c ON c.id = i.category_id \
    JOIN suppliers s ON s.id = i.supplier_id";

//=========================================================================================
// `CredentialStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CredentialStore for DbAdapter {
    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, secret, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_user(&self, username: &str, secret: &str, role: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, secret, role) VALUES ($1, $2, $3) RETURNING id, username, secret, role",
        )
        .bind(username)
        .bind(secret)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(record.to_domain().into_user())
    }

    async fn update_user_secret(&self, user_id: i32, secret: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET secret = $1 WHERE id = $2")
            .bind(secret)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `InventoryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl InventoryStore for DbAdapter {
    async fn get_category(&self, category_id: i32) -> PortResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(record.map(CategoryRecord::to_domain))
    }

    async fn get_supplier(&self, supplier_id: i32) -> PortResult<Option<Supplier>> {
        let record = sqlx::query_as::<_, SupplierRecord>(
            "SELECT id, name, contact_info FROM suppliers WHERE id = $1",
        )
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(record.map(SupplierRecord::to_domain))
    }

    async fn list_items(&self) -> PortResult<Vec<ItemDetails>> {
        let records = sqlx::query_as::<_, ItemDetailsRecord>(&format!(
            "{ITEM_DETAILS_SELECT} ORDER BY i.id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        let items = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(items)
    }

    async fn get_item(&self, item_id: i32) -> PortResult<Option<ItemDetails>> {
        let record = sqlx::query_as::<_, ItemDetailsRecord>(&format!(
            "{ITEM_DETAILS_SELECT} WHERE i.id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;
        Ok(record.map(ItemDetailsRecord::to_domain))
    }

    async fn item_exists(&self, item_id: i32) -> PortResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM items WHERE id = $1)")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)?;
        Ok(exists)
    }

    async fn insert_item(&self, item: &NewItem) -> PortResult<Item> {
        let record = sqlx::query_as::<_, ItemRecord>(
            "INSERT INTO items (name, description, quantity, price, category_id, supplier_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, description, quantity, price, category_id, supplier_id",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.category_id)
        .bind(item.supplier_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(record.to_domain())
    }

    async fn replace_item(&self, item_id: i32, item: &NewItem) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE items SET name = $1, description = $2, quantity = $3, price = $4, \
             category_id = $5, supplier_id = $6 WHERE id = $7",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.category_id)
        .bind(item.supplier_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::Concurrency(format!(
                "update of item {} affected no rows",
                item_id
            )));
        }
        Ok(())
    }

    async fn delete_item(&self, item_id: i32) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(result.rows_affected() > 0)
    }
}
