use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{AdminProduct, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub inventory: i32,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub category_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdminProductList {
    #[schema(value_type = Vec<AdminProduct>)]
    pub items: Vec<AdminProduct>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearInventoryRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearInventoryResponse {
    pub cleared: u64,
}
