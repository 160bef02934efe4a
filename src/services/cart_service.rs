use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{AddCartItemRequest, CartItemList, UpdateCartItemRequest},
    error::{AppError, AppResult},
    models::{Cart, CartItem, ProductSummary},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartItemRow {
    item_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    name: String,
    unit_price: Decimal,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.item_id,
            item_total: item_total(row.quantity, row.unit_price),
            product: ProductSummary {
                id: row.product_id,
                name: row.name,
                unit_price: row.unit_price,
            },
            quantity: row.quantity,
        }
    }
}

const CART_ITEMS_SELECT: &str = r#"
    SELECT ci.id AS item_id, ci.quantity,
           p.id AS product_id, p.name, p.unit_price
    FROM cart_items ci
    JOIN products p ON p.id = ci.product_id
"#;

pub fn item_total(quantity: i32, unit_price: Decimal) -> Decimal {
    unit_price * Decimal::from(quantity)
}

pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(|item| item.item_total).sum()
}

/// Upper bound for a single cart line, merged quantities included.
pub const MAX_ITEM_QUANTITY: i32 = 10_000;

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must not exceed {MAX_ITEM_QUANTITY}"
        )));
    }
    Ok(())
}

async fn fetch_items(pool: &DbPool, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
    let rows = sqlx::query_as::<_, CartItemRow>(&format!(
        "{CART_ITEMS_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.created_at, ci.id"
    ))
    .bind(cart_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CartItem::from).collect())
}

async fn fetch_item(pool: &DbPool, cart_id: Uuid, item_id: Uuid) -> AppResult<CartItem> {
    let row = sqlx::query_as::<_, CartItemRow>(&format!(
        "{CART_ITEMS_SELECT} WHERE ci.cart_id = $1 AND ci.id = $2"
    ))
    .bind(cart_id)
    .bind(item_id)
    .fetch_optional(pool)
    .await?;
    row.map(CartItem::from).ok_or(AppError::NotFound)
}

async fn ensure_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<DateTime<Utc>> {
    let cart: Option<(DateTime<Utc>,)> = sqlx::query_as("SELECT created_at FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
    cart.map(|(created_at,)| created_at).ok_or(AppError::NotFound)
}

pub async fn create_cart(pool: &DbPool) -> AppResult<ApiResponse<Cart>> {
    let id = Uuid::new_v4();
    let (created_at,): (DateTime<Utc>,) =
        sqlx::query_as("INSERT INTO carts (id) VALUES ($1) RETURNING created_at")
            .bind(id)
            .fetch_one(pool)
            .await?;

    tracing::debug!(cart_id = %id, "cart created");

    Ok(ApiResponse::single(
        "Cart created",
        Cart {
            id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
            created_at,
        },
    ))
}

pub async fn get_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<ApiResponse<Cart>> {
    let created_at = ensure_cart(pool, cart_id).await?;
    let items = fetch_items(pool, cart_id).await?;
    let total_price = cart_total(&items);
    Ok(ApiResponse::single(
        "OK",
        Cart {
            id: cart_id,
            items,
            total_price,
            created_at,
        },
    ))
}

pub async fn delete_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM carts WHERE id = $1")
        .bind(cart_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::single("Cart deleted", serde_json::json!({})))
}

pub async fn list_cart_items(pool: &DbPool, cart_id: Uuid) -> AppResult<ApiResponse<CartItemList>> {
    ensure_cart(pool, cart_id).await?;
    let items = fetch_items(pool, cart_id).await?;
    let meta = Meta::whole_list(items.len());
    Ok(ApiResponse::success(
        "OK",
        CartItemList { items },
        Some(meta),
    ))
}

pub async fn get_cart_item(
    pool: &DbPool,
    cart_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let item = fetch_item(pool, cart_id, item_id).await?;
    Ok(ApiResponse::single("OK", item))
}

/// Adds a product to the cart. A product already in the cart has its
/// quantity increased instead of getting a second row.
pub async fn add_cart_item(
    pool: &DbPool,
    cart_id: Uuid,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;
    ensure_cart(pool, cart_id).await?;

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    // The guarded update yields no row when the merged quantity would pass the cap.
    let merged: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO cart_items (id, cart_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        WHERE cart_items.quantity <= $5 - EXCLUDED.quantity
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .bind(MAX_ITEM_QUANTITY)
    .fetch_optional(pool)
    .await?;
    let Some((item_id,)) = merged else {
        return Err(AppError::BadRequest(format!(
            "quantity in cart must not exceed {MAX_ITEM_QUANTITY}"
        )));
    };

    let item = fetch_item(pool, cart_id, item_id).await?;
    Ok(ApiResponse::single("OK", item))
}

pub async fn update_cart_item(
    pool: &DbPool,
    cart_id: Uuid,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;
    let result = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND id = $2")
        .bind(cart_id)
        .bind(item_id)
        .bind(payload.quantity)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let item = fetch_item(pool, cart_id, item_id).await?;
    Ok(ApiResponse::single("Updated", item))
}

pub async fn remove_cart_item(
    pool: &DbPool,
    cart_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = $2")
        .bind(cart_id)
        .bind(item_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::single("Removed from cart", serde_json::json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, cents: i64) -> CartItem {
        let unit_price = Decimal::new(cents, 2);
        CartItem {
            id: Uuid::new_v4(),
            product: ProductSummary {
                id: Uuid::new_v4(),
                name: "Widget".into(),
                unit_price,
            },
            quantity,
            item_total: item_total(quantity, unit_price),
        }
    }

    #[test]
    fn quantities_must_be_positive_and_bounded() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(validate_quantity(0), Err(AppError::BadRequest(_))));
        assert!(matches!(validate_quantity(-2), Err(AppError::BadRequest(_))));
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_quantity(i32::MAX).is_err());
    }

    #[test]
    fn totals_multiply_quantity_by_price() {
        assert_eq!(item_total(3, Decimal::new(250, 2)), Decimal::new(750, 2));
        let items = vec![item(2, 1000), item(1, 500)];
        assert_eq!(cart_total(&items), Decimal::new(2500, 2));
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
