use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit,
    entity::{
        categories::Entity as Categories,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{PRODUCTS_PER_PAGE, ProductOrdering, ProductQuery},
    state::AppState,
};

const MIN_TITLE_LEN: usize = 6;
/// Largest value a NUMERIC(6, 2) column holds.
const MAX_PRICE: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// Sales tax applied on top of the list price.
pub fn tax_multiplier() -> Decimal {
    Decimal::new(109, 2)
}

pub fn unit_price_after_tax(unit_price: Decimal) -> Decimal {
    (unit_price * tax_multiplier()).round_dp(2)
}

/// URL-friendly form of a product name: lowercase ASCII words joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    slug
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().chars().count() < MIN_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Product title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be greater than 0".into()));
    }
    if price > MAX_PRICE {
        return Err(AppError::Validation(format!("price must not exceed {MAX_PRICE}")));
    }
    if price.scale() > 2 {
        return Err(AppError::Validation(
            "price must have at most 2 decimal places".into(),
        ));
    }
    Ok(())
}

fn validate_inventory(inventory: i32) -> AppResult<()> {
    if inventory < 0 {
        return Err(AppError::Validation("inventory cannot be negative".into()));
    }
    Ok(())
}

/// Escapes `LIKE` metacharacters so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn product_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(Expr::col((Products, Column::Name)).ilike(pattern));
    }
    if let Some(prefix) = query.name_startswith.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("{}%", escape_like(prefix));
        condition = condition.add(Expr::col((Products, Column::Name)).like(pattern));
    }
    if let Some(lt) = query.inventory_lt {
        condition = condition.add(Column::Inventory.lt(lt));
    }
    if let Some(gt) = query.inventory_gt {
        condition = condition.add(Column::Inventory.gt(gt));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(filter) = query.inventory {
        let (min, max) = filter.bounds();
        if let Some(min) = min {
            condition = condition.add(Column::Inventory.gte(min));
        }
        if let Some(max) = max {
            condition = condition.add(Column::Inventory.lte(max));
        }
    }

    condition
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize_with(PRODUCTS_PER_PAGE);

    let mut finder = Products::find().filter(product_condition(&query));
    finder = match query.ordering {
        Some(ProductOrdering::NameAsc) => finder.order_by_asc(Column::Name),
        Some(ProductOrdering::NameDesc) => finder.order_by_desc(Column::Name),
        Some(ProductOrdering::PriceAsc) => finder.order_by_asc(Column::UnitPrice),
        Some(ProductOrdering::PriceDesc) => finder.order_by_desc(Column::UnitPrice),
        None => finder.order_by_desc(Column::CreatedAt),
    };
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

/// Product names are unique; `except` skips the product being renamed.
async fn ensure_name_available(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(
            "A product with this title already exists".into(),
        ));
    }
    Ok(())
}

async fn ensure_category(state: &AppState, category_id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest("category not found".into()));
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    validate_title(&payload.title)?;
    validate_price(payload.price)?;
    validate_inventory(payload.inventory)?;
    ensure_category(state, payload.category_id).await?;
    ensure_name_available(state, &payload.title, None).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slugify(&payload.title)),
        name: Set(payload.title),
        description: Set(payload.description),
        unit_price: Set(payload.price),
        inventory: Set(payload.inventory),
        category_id: Set(payload.category_id),
        created_at: Set(Utc::now().into()),
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single(
        "Product created",
        product_from_entity(product),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        validate_title(&title)?;
        ensure_name_available(state, &title, Some(id)).await?;
        active.slug = Set(slugify(&title));
        active.name = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.unit_price = Set(price);
    }
    if let Some(inventory) = payload.inventory {
        validate_inventory(inventory)?;
        active.inventory = Set(inventory);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(state, category_id).await?;
        active.category_id = Set(category_id);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single("Updated", product_from_entity(product)))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if Products::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let referenced = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::MethodNotAllowed(
            "There are order items including this product. Please remove them first".into(),
        ));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        title: model.name,
        slug: model.slug,
        description: model.description,
        price: model.unit_price,
        unit_price_after_tax: unit_price_after_tax(model.unit_price),
        inventory: model.inventory,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_is_rounded_to_cents() {
        assert_eq!(unit_price_after_tax(Decimal::new(1000, 2)), Decimal::new(1090, 2));
        assert_eq!(unit_price_after_tax(Decimal::new(199, 2)), Decimal::new(217, 2));
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("Ferris  Coffee Mug"), "ferris-coffee-mug");
        assert_eq!(slugify(" Rust - Stickers! "), "rust-stickers");
        assert_eq!(slugify("e-book"), "e-book");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("mug"), "mug");
    }

    #[test]
    fn short_titles_are_rejected() {
        assert!(validate_title("Mug").is_err());
        assert!(validate_title("Hoodie").is_ok());
    }

    #[test]
    fn prices_must_be_positive_cents() {
        assert!(validate_price(Decimal::new(500, 2)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::new(1234, 3)).is_err());
        assert!(validate_price(Decimal::new(999_999, 2)).is_ok());
        assert!(validate_price(Decimal::new(1_000_000, 2)).is_err());
    }
}
