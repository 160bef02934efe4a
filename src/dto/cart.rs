use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartItemList {
    #[schema(value_type = Vec<CartItem>)]
    pub items: Vec<CartItem>,
}
