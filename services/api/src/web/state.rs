//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::auth::{AuthUser, Authenticator};
use crate::config::Config;
use crate::error::ApiError;
use inventory_core::InventoryService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Authenticator,
    pub inventory: InventoryService,
}

impl AppState {
    /// Role hook for the item-mutating routes. Without a configured write
    /// role every authenticated caller may write.
    pub fn authorize_write(&self, user: &AuthUser) -> Result<(), ApiError> {
        match &self.config.inventory_write_role {
            Some(role) => user.require_role(role),
            None => Ok(()),
        }
    }
}
