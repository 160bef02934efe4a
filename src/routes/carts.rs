use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, CartItemList, UpdateCartItemRequest},
    error::AppResult,
    models::{Cart, CartItem},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

// Carts are anonymous: the unguessable id is the only handle on them.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{id}", get(get_cart).delete(delete_cart))
        .route("/{id}/items", get(list_items).post(add_item))
        .route(
            "/{id}/items/{item_id}",
            get(get_item).patch(update_item).delete(remove_item),
        )
}

#[utoipa::path(
    post,
    path = "/api/carts",
    responses(
        (status = 201, description = "Create an empty cart", body = ApiResponse<Cart>)
    ),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<ApiResponse<Cart>>)> {
    let resp = cart_service::create_cart(&state.pool).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart with items and total", body = ApiResponse<Cart>),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::get_cart(&state.pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::delete_cart(&state.pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Items in the cart", body = ApiResponse<CartItemList>),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartItemList>>> {
    let resp = cart_service::list_cart_items(&state.pool, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Add a product, or increase its quantity", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Cart not found")
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartItem>>)> {
    let resp = cart_service::add_cart_item(&state.pool, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Get cart item", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found")
    ),
    tag = "Cart"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::get_cart_item(&state.pool, id, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Set item quantity", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Cart item not found")
    ),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_cart_item(&state.pool, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found")
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_cart_item(&state.pool, id, item_id).await?;
    Ok(Json(resp))
}
