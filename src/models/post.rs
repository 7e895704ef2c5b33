use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub user_name: String,
    pub user_image: Option<String>,
    pub media_type: MediaType,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub caption: String,
    pub location: Option<PostLocation>,
    #[serde(default)]
    pub likes_count: u32,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub media_type: MediaType,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub caption: String,
    pub location: Option<PostLocation>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostUpdate {
    pub caption: Option<String>,
    pub location: Option<PostLocation>,
    pub thumbnail_url: Option<String>,
}
