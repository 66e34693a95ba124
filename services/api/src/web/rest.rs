//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the inventory endpoints and the master
//! definition for the OpenAPI specification.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::web::auth::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use inventory_core::{Category, ItemDetails, NewItem, Supplier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::login_handler,
        crate::web::auth::register_handler,
        list_items_handler,
        get_item_handler,
        create_item_handler,
        update_item_handler,
        delete_item_handler,
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            RegisterResponse,
            TokenResponse,
            ItemPayload,
            ItemResponse,
            CategoryResponse,
            SupplierResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Inventory API", description = "Stock items, their categories and suppliers.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The writable fields of an item. PascalCase keys are accepted as well.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "Quantity")]
    pub quantity: i32,
    #[serde(default, alias = "Price")]
    pub price: f64,
    #[serde(alias = "CategoryId")]
    pub category_id: i32,
    #[serde(alias = "SupplierId")]
    pub supplier_id: i32,
}

impl From<ItemPayload> for NewItem {
    fn from(payload: ItemPayload) -> Self {
        NewItem {
            name: payload.name,
            description: payload.description,
            quantity: payload.quantity,
            price: payload.price,
            category_id: payload.category_id,
            supplier_id: payload.supplier_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: i32,
    pub name: String,
    pub contact_info: String,
}

/// An item with its category and supplier.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub category_id: i32,
    pub supplier_id: i32,
    pub category: CategoryResponse,
    pub supplier: SupplierResponse,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            contact_info: supplier.contact_info,
        }
    }
}

impl From<ItemDetails> for ItemResponse {
    fn from(details: ItemDetails) -> Self {
        let item = details.item;
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
            category_id: item.category_id,
            supplier_id: item.supplier_id,
            category: details.category.into(),
            supplier: details.supplier.into(),
        }
    }
}

fn read_payload(payload: Result<Json<ItemPayload>, JsonRejection>) -> Result<NewItem, ApiError> {
    payload
        .map(|Json(payload)| payload.into())
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every item with its category and supplier.
#[utoipa::path(
    get,
    path = "/inventory",
    responses(
        (status = 200, description = "All items", body = [ItemResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "The items could not be retrieved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_items_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.inventory.list_items().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Fetch one item with its category and supplier.
#[utoipa::path(
    get,
    path = "/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = ItemResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such item")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ItemResponse>, ApiError> {
    let details = state.inventory.get_item(id).await?;
    Ok(Json(details.into()))
}

/// Create an item. The category and supplier must already exist.
#[utoipa::path(
    post,
    path = "/inventory",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created; Location points at the new item", body = ItemResponse),
        (status = 400, description = "Invalid reference or the item could not be saved"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed to write")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    state.authorize_write(&user)?;
    let new_item = read_payload(payload)?;

    let details = state.inventory.create_item(new_item).await?;
    let location = format!("/inventory/{}", details.item.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ItemResponse::from(details)),
    ))
}

/// Replace an item. The category and supplier must already exist.
#[utoipa::path(
    put,
    path = "/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 204, description = "Item updated"),
        (status = 400, description = "Invalid reference"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed to write"),
        (status = 404, description = "No such item")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    state.authorize_write(&user)?;
    let new_item = read_payload(payload)?;

    state.inventory.update_item(id, new_item).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an item.
#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed to write"),
        (status = 404, description = "No such item")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.authorize_write(&user)?;

    state.inventory.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
