use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::comments::{CommentList, CreateCommentRequest, UpdateCommentRequest},
    entity::{
        comments::{ActiveModel, Column, Entity as Comments, Model as CommentModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Comment, CommentStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn ensure_product(state: &AppState, product_id: Uuid) -> AppResult<()> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }
    Ok(())
}

async fn find_comment(state: &AppState, product_id: Uuid, id: Uuid) -> AppResult<CommentModel> {
    Comments::find()
        .filter(
            Condition::all()
                .add(Column::ProductId.eq(product_id))
                .add(Column::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_comments(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<CommentList>> {
    ensure_product(state, product_id).await?;
    let items: Vec<Comment> = Comments::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(comment_from_entity)
        .collect::<AppResult<_>>()?;
    let meta = Meta::whole_list(items.len());
    Ok(ApiResponse::success(
        "Comments",
        CommentList { items },
        Some(meta),
    ))
}

pub async fn get_comment(
    state: &AppState,
    product_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<Comment>> {
    let comment = find_comment(state, product_id, id).await?;
    Ok(ApiResponse::single("Comment", comment_from_entity(comment)?))
}

pub async fn create_comment(
    state: &AppState,
    product_id: Uuid,
    payload: CreateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    if payload.name.trim().is_empty() || payload.body.trim().is_empty() {
        return Err(AppError::Validation("name and body are required".into()));
    }
    ensure_product(state, product_id).await?;

    let comment = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        name: Set(payload.name),
        body: Set(payload.body),
        status: Set(CommentStatus::Waiting.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::single("Comment created", comment_from_entity(comment)?))
}

/// Moderation endpoint: staff may edit text and change the status.
pub async fn update_comment(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    id: Uuid,
    payload: UpdateCommentRequest,
) -> AppResult<ApiResponse<Comment>> {
    ensure_admin(user)?;
    let existing = find_comment(state, product_id, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(body) = payload.body {
        active.body = Set(body);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    let comment = active.update(&state.orm).await?;

    Ok(ApiResponse::single("Updated", comment_from_entity(comment)?))
}

pub async fn delete_comment(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let comment = find_comment(state, product_id, id).await?;
    Comments::delete_by_id(comment.id).exec(&state.orm).await?;
    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}

fn comment_from_entity(model: CommentModel) -> AppResult<Comment> {
    Ok(Comment {
        id: model.id,
        product_id: model.product_id,
        name: model.name,
        body: model.body,
        status: CommentStatus::parse(&model.status)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
