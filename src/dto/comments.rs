use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Comment, CommentStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub name: Option<String>,
    pub body: Option<String>,
    pub status: Option<CommentStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CommentList {
    #[schema(value_type = Vec<Comment>)]
    pub items: Vec<Comment>,
}
