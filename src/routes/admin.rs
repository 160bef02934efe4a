use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::products::{AdminProductList, ClearInventoryRequest, ClearInventoryResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{LowStockQuery, ProductQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/inventory/low-stock", get(list_low_stock))
        .route("/inventory/clear", post(clear_inventory))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search"),
        ("inventory_lt" = Option<i32>, Query, description = "Inventory below"),
        ("inventory_gt" = Option<i32>, Query, description = "Inventory above"),
        ("category_id" = Option<uuid::Uuid>, Query, description = "Category filter"),
        ("inventory" = Option<String>, Query, description = "low (<3), medium (3-15) or high (>=17)")
    ),
    responses(
        (status = 200, description = "Products with inventory status, stock value and comment count", body = ApiResponse<AdminProductList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<AdminProductList>>> {
    let resp = admin_service::list_products_admin(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    params(
        ("threshold" = Option<i32>, Query, description = "Inventory strictly below, default 3"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List low stock products", body = ApiResponse<AdminProductList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<AdminProductList>>> {
    let resp = admin_service::list_low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/inventory/clear",
    request_body = ClearInventoryRequest,
    responses(
        (status = 200, description = "Set inventory to zero for the given products", body = ApiResponse<ClearInventoryResponse>),
        (status = 400, description = "No products given"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn clear_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ClearInventoryRequest>,
) -> AppResult<Json<ApiResponse<ClearInventoryResponse>>> {
    let resp = admin_service::clear_inventory(&state, &user, payload).await?;
    Ok(Json(resp))
}
