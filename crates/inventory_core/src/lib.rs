pub mod domain;
pub mod inventory;
pub mod ports;

pub use domain::{Category, Item, ItemDetails, NewItem, Supplier, User, UserCredentials};
pub use inventory::{InventoryService, ServiceError, ServiceResult};
pub use ports::{CredentialStore, InventoryStore, PortError, PortResult};
