use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderView,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).patch(update_order_status).delete(delete_order),
        )
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, complete or failed"),
        ("sort_order" = Option<String>, Query, description = "asc or desc by creation time")
    ),
    responses(
        (status = 200, description = "Staff see every order, customers their own", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Turn the cart into an order", body = ApiResponse<OrderView>),
        (status = 400, description = "Cart missing or empty"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No customer profile for the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderView>>)> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order with items", body = ApiResponse<OrderView>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Update order status (admin only)", body = ApiResponse<OrderView>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order deleted (admin only)", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}
