use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{OrderStatus, OrderView};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub cart_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderView>)]
    pub items: Vec<OrderView>,
}
