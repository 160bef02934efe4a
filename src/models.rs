use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Complete,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Complete => "complete",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(OrderStatus::Pending),
            "complete" => Ok(OrderStatus::Complete),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(AppError::BadRequest(format!("invalid order status `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Waiting,
    Approved,
    NotApproved,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Waiting => "waiting",
            CommentStatus::Approved => "approved",
            CommentStatus::NotApproved => "not_approved",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "waiting" => Ok(CommentStatus::Waiting),
            "approved" => Ok(CommentStatus::Approved),
            "not_approved" => Ok(CommentStatus::NotApproved),
            other => Err(AppError::BadRequest(format!(
                "invalid comment status `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Low,
    Medium,
    High,
}

impl InventoryStatus {
    pub fn for_inventory(inventory: i32) -> Self {
        if inventory < 10 {
            InventoryStatus::Low
        } else if inventory > 20 {
            InventoryStatus::High
        } else {
            InventoryStatus::Medium
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub products_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub unit_price_after_tax: Decimal,
    pub inventory: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Staff view of a product with inventory bookkeeping.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminProduct {
    #[serde(flatten)]
    pub product: Product,
    pub inventory_status: InventoryStatus,
    #[schema(value_type = String)]
    pub stock_value: Decimal,
    pub comments_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub body: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub item_total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub product: ProductSummary,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderCustomer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminOrder {
    pub id: Uuid,
    pub customer: OrderCustomer,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerOrder {
    pub customer: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// The shape of an order depends on who is looking at it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OrderView {
    Admin(AdminOrder),
    Customer(CustomerOrder),
}

impl OrderView {
    pub fn status(&self) -> OrderStatus {
        match self {
            OrderView::Admin(order) => order.status,
            OrderView::Customer(order) => order.status,
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        match self {
            OrderView::Admin(order) => &order.items,
            OrderView::Customer(order) => &order.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_through_storage_text() {
        for status in [OrderStatus::Pending, OrderStatus::Complete, OrderStatus::Failed] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::parse("shipped").is_err());
    }

    #[test]
    fn comment_status_rejects_unknown_values() {
        assert_eq!(
            CommentStatus::parse("not_approved").unwrap(),
            CommentStatus::NotApproved
        );
        assert!(CommentStatus::parse("w").is_err());
    }

    #[test]
    fn inventory_buckets() {
        assert_eq!(InventoryStatus::for_inventory(0), InventoryStatus::Low);
        assert_eq!(InventoryStatus::for_inventory(9), InventoryStatus::Low);
        assert_eq!(InventoryStatus::for_inventory(10), InventoryStatus::Medium);
        assert_eq!(InventoryStatus::for_inventory(20), InventoryStatus::Medium);
        assert_eq!(InventoryStatus::for_inventory(21), InventoryStatus::High);
    }
}
