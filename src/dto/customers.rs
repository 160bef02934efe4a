use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Customer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerList {
    #[schema(value_type = Vec<Customer>)]
    pub items: Vec<Customer>,
}
