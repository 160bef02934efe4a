use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{AdminProductList, ClearInventoryRequest, ClearInventoryResponse},
    entity::{
        comments::Column as CommentCol,
        products::{self, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{AdminProduct, InventoryStatus},
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, ProductQuery},
    services::product_service::{product_condition, product_from_entity},
    state::AppState,
};

pub const LOW_STOCK_THRESHOLD: i32 = 3;

#[derive(Debug, FromQueryResult)]
struct AdminProductRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    unit_price: Decimal,
    inventory: i32,
    category_id: Uuid,
    created_at: DateTimeWithTimeZone,
    comments_count: i64,
}

impl From<AdminProductRow> for AdminProduct {
    fn from(row: AdminProductRow) -> Self {
        let product = ProductModel {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            unit_price: row.unit_price,
            inventory: row.inventory,
            category_id: row.category_id,
            created_at: row.created_at,
        };
        admin_product_view(product, row.comments_count)
    }
}

pub fn admin_product_view(product: ProductModel, comments_count: i64) -> AdminProduct {
    let inventory_status = InventoryStatus::for_inventory(product.inventory);
    let stock_value = product.unit_price * Decimal::from(product.inventory);
    AdminProduct {
        product: product_from_entity(product),
        inventory_status,
        stock_value,
        comments_count,
    }
}

fn with_comment_counts() -> sea_orm::Select<Products> {
    Products::find()
        .column_as(CommentCol::Id.count(), "comments_count")
        .join(JoinType::LeftJoin, products::Relation::Comments.def())
        .group_by(ProdCol::Id)
}

/// Staff catalogue view. Accepts the public product filters and orders by
/// newest first.
pub async fn list_products_admin(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<AdminProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let condition = product_condition(&query);

    let total = Products::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let items = with_comment_counts()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt)
        .order_by_asc(ProdCol::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .into_model::<AdminProductRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AdminProduct::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        AdminProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<AdminProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let total = Products::find()
        .filter(ProdCol::Inventory.lt(threshold))
        .count(&state.orm)
        .await? as i64;

    let items = with_comment_counts()
        .filter(ProdCol::Inventory.lt(threshold))
        .order_by_asc(ProdCol::Inventory)
        .order_by_desc(ProdCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .into_model::<AdminProductRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AdminProduct::from)
        .collect();

    Ok(ApiResponse::success(
        "Low stock",
        AdminProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn clear_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: ClearInventoryRequest,
) -> AppResult<ApiResponse<ClearInventoryResponse>> {
    ensure_admin(user)?;
    if payload.product_ids.is_empty() {
        return Err(AppError::BadRequest("product_ids must not be empty".into()));
    }

    let result = Products::update_many()
        .col_expr(ProdCol::Inventory, Expr::value(0))
        .filter(ProdCol::Id.is_in(payload.product_ids.clone()))
        .exec(&state.orm)
        .await?;

    tracing::warn!(cleared = result.rows_affected, "product inventories cleared to zero");

    audit::record(
        &state.pool,
        Some(user.user_id),
        "inventory_clear",
        "products",
        serde_json::json!({ "product_ids": payload.product_ids, "cleared": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::single(
        format!("{} product inventories cleared to zero", result.rows_affected),
        ClearInventoryResponse {
            cleared: result.rows_affected,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(inventory: i32, cents: i64) -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            name: "Ferris Mug".into(),
            slug: "ferris-mug".into(),
            description: String::new(),
            unit_price: Decimal::new(cents, 2),
            inventory,
            category_id: Uuid::new_v4(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn stock_value_is_inventory_times_price() {
        let view = admin_product_view(product(4, 1250), 2);
        assert_eq!(view.stock_value, Decimal::new(5000, 2));
        assert_eq!(view.inventory_status, InventoryStatus::Low);
        assert_eq!(view.comments_count, 2);
    }

    #[test]
    fn admin_view_flattens_product_fields() {
        let view = admin_product_view(product(25, 100), 0);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Ferris Mug");
        assert_eq!(json["inventory_status"], "high");
    }
}
