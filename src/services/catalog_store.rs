use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::spot::Spot;
use crate::models::video::{Video, VideoStatus};

const VIDEO_LIMIT: i64 = 50;

pub async fn get_spot(db: &Db, id: ObjectId) -> Result<Spot, ApiError> {
    db.spots()
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("Spot"))
}

pub async fn get_video(db: &Db, id: ObjectId) -> Result<Video, ApiError> {
    db.videos()
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("Video"))
}

pub async fn list_public_videos(db: &Db) -> Result<Vec<Video>, ApiError> {
    Ok(db
        .videos()
        .find(doc! { "status": bson::to_bson(&VideoStatus::Public)? })
        .sort(doc! { "created_at": -1 })
        .limit(VIDEO_LIMIT)
        .await?
        .try_collect()
        .await?)
}
