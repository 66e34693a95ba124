pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use self::auth::{login_handler, register_handler};
use self::middleware::{log_requests, require_auth};
use self::rest::{
    create_item_handler, delete_item_handler, get_item_handler, list_items_handler,
    update_item_handler,
};
use self::state::AppState;

/// Builds the API router: public auth routes, token-protected inventory
/// routes, and request logging around everything.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/register", post(register_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/inventory",
            get(list_items_handler).post(create_item_handler),
        )
        .route(
            "/inventory/{id}",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(log_requests))
        .with_state(app_state)
}
