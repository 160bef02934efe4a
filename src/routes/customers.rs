use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::customers::{CustomerList, UpdateCustomerRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Customer,
    response::ApiResponse,
    routes::params::Pagination,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/me", get(get_me).put(update_me))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List customers (admin only)", body = ApiResponse<CustomerList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/me",
    responses(
        (status = 200, description = "Customer profile of the caller", body = ApiResponse<Customer>),
        (status = 404, description = "No customer profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_me(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers/me",
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Update own profile", body = ApiResponse<Customer>),
        (status = 404, description = "No customer profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_me(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Get customer (admin only)", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Update customer (admin only)", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Customer not found"),
        (status = 405, description = "Customer has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::delete_customer(&state, &user, id).await?;
    Ok(Json(resp))
}
