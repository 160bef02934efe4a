use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{self, ActiveModel, Column, Entity as Categories},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    id: Uuid,
    title: String,
    description: String,
    products_count: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            title: row.title,
            description: row.description,
            products_count: row.products_count,
        }
    }
}

fn with_products_count() -> sea_orm::Select<Categories> {
    Categories::find()
        .select_only()
        .column(Column::Id)
        .column(Column::Title)
        .column(Column::Description)
        .column_as(ProdCol::Id.count(), "products_count")
        .join(JoinType::LeftJoin, categories::Relation::Products.def())
        .group_by(Column::Id)
        .group_by(Column::Title)
        .group_by(Column::Description)
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    Ok(())
}

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = pagination.normalize();
    let total = Categories::find().count(&state.orm).await? as i64;

    let items = with_products_count()
        .order_by_asc(Column::Title)
        .limit(limit as u64)
        .offset(offset as u64)
        .into_model::<CategoryRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn load_category(state: &AppState, id: Uuid) -> AppResult<Category> {
    with_products_count()
        .filter(Column::Id.eq(id))
        .into_model::<CategoryRow>()
        .one(&state.orm)
        .await?
        .map(Category::from)
        .ok_or(AppError::NotFound)
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let category = load_category(state, id).await?;
    Ok(ApiResponse::single("Category", category))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    validate_title(&payload.title)?;

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        description: Set(payload.description),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::single(
        "Category created",
        Category {
            id: category.id,
            title: category.title,
            description: category.description,
            products_count: 0,
        },
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        validate_title(&title)?;
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.update(&state.orm).await?;

    let category = load_category(state, id).await?;
    Ok(ApiResponse::single("Updated", category))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if products > 0 {
        return Err(AppError::MethodNotAllowed(
            "There are products in this category. Please remove them first".into(),
        ));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}
