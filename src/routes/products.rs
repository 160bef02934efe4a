use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::comments::{CommentList, CreateCommentRequest, UpdateCommentRequest},
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Comment, Product},
    response::ApiResponse,
    routes::params::ProductQuery,
    services::{comment_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/comments", get(list_comments).post(create_comment))
        .route(
            "/{id}/comments/{comment_id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search"),
        ("name_startswith" = Option<String>, Query, description = "Name prefix"),
        ("inventory_lt" = Option<i32>, Query, description = "Inventory below"),
        ("inventory_gt" = Option<i32>, Query, description = "Inventory above"),
        ("category_id" = Option<Uuid>, Query, description = "Category filter"),
        ("inventory" = Option<String>, Query, description = "low (<3), medium (3-15) or high (>=17)"),
        ("ordering" = Option<String>, Query, description = "name, -name, unit_price, -unit_price")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update product", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found"),
        (status = 405, description = "Product is referenced by order items")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Comments on a product", body = ApiResponse<CommentList>),
        (status = 404, description = "Product not found")
    ),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CommentList>>> {
    let resp = comment_service::list_comments(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment submitted for moderation", body = ApiResponse<Comment>),
        (status = 404, description = "Product not found")
    ),
    tag = "Comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let resp = comment_service::create_comment(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Get comment", body = ApiResponse<Comment>),
        (status = 404, description = "Comment not found")
    ),
    tag = "Comments"
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let resp = comment_service::get_comment(&state, id, comment_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Moderate comment", body = ApiResponse<Comment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let resp = comment_service::update_comment(&state, &user, id, comment_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = comment_service::delete_comment(&state, &user, id, comment_id).await?;
    Ok(Json(resp))
}
