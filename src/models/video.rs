use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Public,
    Private,
    Pending,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub uploader_id: String,
    pub video_url: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub linked_spots: Vec<String>,
    pub status: VideoStatus,
    #[serde(default)]
    pub likes_count: u32,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
