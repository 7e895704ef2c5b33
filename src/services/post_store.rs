use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::like::LikeState;
use crate::models::post::{CreatePostRequest, MediaType, Post, PostUpdate};
use crate::services::like_store::{self, LikeTarget};
use crate::services::media_service::MediaService;

pub const DEFAULT_FEED_LIMIT: i64 = 20;

pub struct PostAuthor {
    pub user_id: String,
    pub name: String,
    pub image: Option<String>,
}

pub fn new_post(author: PostAuthor, request: CreatePostRequest) -> Result<Post, ApiError> {
    if request.media_url.trim().is_empty() {
        return Err(ApiError::BadRequest("media_url is required".to_string()));
    }
    Ok(Post {
        id: None,
        user_id: author.user_id,
        user_name: author.name,
        user_image: author.image,
        media_type: request.media_type,
        media_url: request.media_url,
        thumbnail_url: request.thumbnail_url,
        caption: request.caption,
        location: request.location,
        likes_count: 0,
        created_at: DateTime::now(),
    })
}

pub async fn create_post(
    db: &Db,
    author: PostAuthor,
    request: CreatePostRequest,
) -> Result<Post, ApiError> {
    let post = new_post(author, request)?;
    let result = db.posts().insert_one(&post).await?;
    log::info!("Created {:?} post for {}", post.media_type, post.user_id);

    Ok(Post {
        id: result.inserted_id.as_object_id(),
        ..post
    })
}

pub async fn list_posts(db: &Db, limit: Option<i64>) -> Result<Vec<Post>, ApiError> {
    let limit = limit.filter(|n| *n > 0).unwrap_or(DEFAULT_FEED_LIMIT);
    Ok(db
        .posts()
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .await?
        .try_collect()
        .await?)
}

/// Video posts only, newest first.
pub async fn list_reels(db: &Db, limit: Option<i64>) -> Result<Vec<Post>, ApiError> {
    let limit = limit.filter(|n| *n > 0).unwrap_or(DEFAULT_FEED_LIMIT);
    Ok(db
        .posts()
        .find(doc! { "media_type": bson::to_bson(&MediaType::Video)? })
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .await?
        .try_collect()
        .await?)
}

pub async fn get_post(db: &Db, id: ObjectId) -> Result<Post, ApiError> {
    db.posts()
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("Post"))
}

pub async fn list_user_posts(db: &Db, user_id: &str) -> Result<Vec<Post>, ApiError> {
    Ok(db
        .posts()
        .find(doc! { "user_id": user_id })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?)
}

async fn require_owner(db: &Db, id: ObjectId, user_id: &str) -> Result<Post, ApiError> {
    let post = get_post(db, id).await?;
    if post.user_id != user_id {
        return Err(ApiError::Forbidden);
    }
    Ok(post)
}

pub async fn update_post(
    db: &Db,
    id: ObjectId,
    user_id: &str,
    update: &PostUpdate,
) -> Result<Post, ApiError> {
    let fields = bson::to_document(update)?;
    if fields.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }
    require_owner(db, id, user_id).await?;

    db.posts()
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("Post"))
}

/// Removes the post, its likes and its media. A media object that cannot be
/// deleted is only logged.
pub async fn delete_post(
    db: &Db,
    media: &MediaService,
    id: ObjectId,
    user_id: &str,
) -> Result<(), ApiError> {
    let post = require_owner(db, id, user_id).await?;
    db.posts().delete_one(doc! { "_id": id }).await?;
    like_store::clear_likes(db, LikeTarget::Post, id).await?;

    let urls = std::iter::once(&post.media_url).chain(post.thumbnail_url.as_ref());
    for url in urls {
        if let Err(e) = media.delete_by_url(url).await {
            log::warn!("Post {} deleted but media cleanup failed: {}", id, e);
        }
    }

    log::info!("Deleted post {}", id);
    Ok(())
}

pub async fn toggle_post_like(db: &Db, id: ObjectId, user_id: &str) -> Result<LikeState, ApiError> {
    like_store::toggle_like(db, LikeTarget::Post, id, user_id).await
}

pub async fn post_like_status(db: &Db, id: ObjectId, user_id: &str) -> Result<bool, ApiError> {
    like_store::like_status(db, LikeTarget::Post, id, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::PostLocation;

    fn author() -> PostAuthor {
        PostAuthor {
            user_id: "u1".to_string(),
            name: "Aki".to_string(),
            image: None,
        }
    }

    #[test]
    fn new_post_starts_without_likes() {
        let post = new_post(
            author(),
            CreatePostRequest {
                media_type: MediaType::Photo,
                media_url: "https://storage.googleapis.com/b/posts/u1/1_a.jpg".to_string(),
                thumbnail_url: None,
                caption: "伏見稲荷".to_string(),
                location: Some(PostLocation {
                    name: "伏見稲荷大社".to_string(),
                    lat: 34.967,
                    lng: 135.772,
                }),
            },
        )
        .unwrap();
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.user_name, "Aki");
        assert!(post.id.is_none());
    }

    #[test]
    fn post_without_media_is_rejected() {
        let result = new_post(
            author(),
            CreatePostRequest {
                media_type: MediaType::Video,
                media_url: " ".to_string(),
                thumbnail_url: None,
                caption: String::new(),
                location: None,
            },
        );
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn media_type_is_stored_lowercase() {
        assert_eq!(
            bson::to_bson(&MediaType::Video).unwrap(),
            bson::Bson::String("video".to_string())
        );
    }
}
