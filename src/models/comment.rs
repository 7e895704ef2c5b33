use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// A comment on either a route or a post; exactly one target id is set.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub route_id: Option<String>,
    pub post_id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_image: Option<String>,
    pub content: String,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}
