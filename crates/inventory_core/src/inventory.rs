//! crates/inventory_core/src/inventory.rs
//!
//! The inventory use cases: item CRUD with referential checks against
//! categories and suppliers, mapped onto the outcomes the web layer reports.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::{Category, ItemDetails, NewItem, Supplier};
use crate::ports::{InventoryStore, PortError};

/// Message returned in place of store details when listing fails.
pub const LIST_FAILURE_MESSAGE: &str = "An error occurred while retrieving the items.";

/// Outcomes of inventory operations other than success.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Carries a message that is safe to show to the caller.
    #[error("{0}")]
    Internal(String),
    /// A store failure passed through untouched.
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Item CRUD over an [`InventoryStore`].
///
/// Every operation is independent; the service keeps no state of its own
/// between calls, so one instance is shared by all requests.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Lists every item with its category and supplier resolved.
    pub async fn list_items(&self) -> ServiceResult<Vec<ItemDetails>> {
        info!(operation = "list_items", at = %Utc::now(), "Fetching all items");

        match self.store.list_items().await {
            Ok(items) => {
                info!(
                    operation = "list_items",
                    item_count = items.len(),
                    at = %Utc::now(),
                    "Successfully fetched items"
                );
                Ok(items)
            }
            Err(e) => {
                error!(operation = "list_items", error = ?e, at = %Utc::now(), "Error while fetching items");
                Err(ServiceError::Internal(LIST_FAILURE_MESSAGE.to_string()))
            }
        }
    }

    /// Fetches one item with its category and supplier resolved.
    pub async fn get_item(&self, item_id: i32) -> ServiceResult<ItemDetails> {
        info!(operation = "get_item", item_id, at = %Utc::now(), "Fetching item");

        let details = self.store.get_item(item_id).await.map_err(|e| {
            error!(operation = "get_item", item_id, error = ?e, at = %Utc::now(), "Error while fetching item");
            ServiceError::Port(e)
        })?;

        match details {
            Some(details) => {
                info!(operation = "get_item", item_id, at = %Utc::now(), "Successfully fetched item");
                Ok(details)
            }
            None => {
                warn!(operation = "get_item", item_id, at = %Utc::now(), "Item not found");
                Err(not_found(item_id))
            }
        }
    }

    /// Validates the references, then inserts the item.
    ///
    /// Any failure of the insert itself is reported as a bad request that
    /// carries the store's reason.
    pub async fn create_item(&self, new_item: NewItem) -> ServiceResult<ItemDetails> {
        info!(
            operation = "create_item",
            category_id = new_item.category_id,
            supplier_id = new_item.supplier_id,
            at = %Utc::now(),
            "Creating new item"
        );

        let (category, supplier) = self.resolve_references(&new_item).await?;

        match self.store.insert_item(&new_item).await {
            Ok(item) => {
                info!(operation = "create_item", item_id = item.id, at = %Utc::now(), "Successfully created item");
                Ok(ItemDetails {
                    item,
                    category,
                    supplier,
                })
            }
            Err(e) => {
                error!(operation = "create_item", error = ?e, at = %Utc::now(), "Error while saving the item");
                Err(ServiceError::BadRequest(format!(
                    "Error while saving the item: {e}"
                )))
            }
        }
    }

    /// Validates the references, then replaces the stored item.
    ///
    /// A replace that writes nothing is re-classified: if the item is gone it
    /// is `NotFound`, otherwise the store error is returned as-is.
    pub async fn update_item(&self, item_id: i32, new_item: NewItem) -> ServiceResult<()> {
        info!(
            operation = "update_item",
            item_id,
            category_id = new_item.category_id,
            supplier_id = new_item.supplier_id,
            at = %Utc::now(),
            "Updating item"
        );

        self.resolve_references(&new_item).await?;

        match self.store.replace_item(item_id, &new_item).await {
            Ok(()) => {
                info!(operation = "update_item", item_id, at = %Utc::now(), "Successfully updated item");
                Ok(())
            }
            Err(e @ PortError::Concurrency(_)) => {
                if self.store.item_exists(item_id).await? {
                    error!(operation = "update_item", item_id, error = ?e, at = %Utc::now(), "Concurrent update failed");
                    Err(ServiceError::Port(e))
                } else {
                    warn!(operation = "update_item", item_id, at = %Utc::now(), "Item not found during update");
                    Err(not_found(item_id))
                }
            }
            Err(e) => {
                error!(operation = "update_item", item_id, error = ?e, at = %Utc::now(), "Error while updating item");
                Err(ServiceError::Port(e))
            }
        }
    }

    pub async fn delete_item(&self, item_id: i32) -> ServiceResult<()> {
        info!(operation = "delete_item", item_id, at = %Utc::now(), "Deleting item");

        let deleted = self.store.delete_item(item_id).await.map_err(|e| {
            error!(operation = "delete_item", item_id, error = ?e, at = %Utc::now(), "Error while deleting item");
            ServiceError::Port(e)
        })?;

        if !deleted {
            warn!(operation = "delete_item", item_id, at = %Utc::now(), "Item not found during delete");
            return Err(not_found(item_id));
        }

        info!(operation = "delete_item", item_id, at = %Utc::now(), "Successfully deleted item");
        Ok(())
    }

    /// Looks up the category and supplier an item points at. Nothing is
    /// written when either is missing.
    async fn resolve_references(&self, item: &NewItem) -> ServiceResult<(Category, Supplier)> {
        let Some(category) = self.store.get_category(item.category_id).await? else {
            warn!(category_id = item.category_id, at = %Utc::now(), "Invalid CategoryId");
            return Err(ServiceError::BadRequest("Invalid CategoryId".to_string()));
        };

        let Some(supplier) = self.store.get_supplier(item.supplier_id).await? else {
            warn!(supplier_id = item.supplier_id, at = %Utc::now(), "Invalid SupplierId");
            return Err(ServiceError::BadRequest("Invalid SupplierId".to_string()));
        };

        Ok((category, supplier))
    }
}

fn not_found(item_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Item with Id {item_id} not found"))
}
