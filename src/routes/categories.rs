use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::Pagination,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List categories with product counts", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Category not found"),
        (status = 405, description = "Category still has products")
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}
