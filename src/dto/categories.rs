use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Category;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
