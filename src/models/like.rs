use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Presence of this document means `user_id` likes `target_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LikeMarker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub target_id: ObjectId,
    pub user_id: String,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u32,
}
