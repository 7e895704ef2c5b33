use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime, Document};
use mongodb::options::ReturnDocument;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::post::Post;
use crate::models::user::{Companion, ProfileUpdate, TravelStyle, User};

pub async fn get_user(db: &Db, user_id: &str) -> Result<Option<User>, ApiError> {
    Ok(db.users().find_one(doc! { "user_id": user_id }).await?)
}

async fn require_user(db: &Db, user_id: &str) -> Result<User, ApiError> {
    get_user(db, user_id).await?.ok_or(ApiError::NotFound("User"))
}

/// Returns the stored record, creating it from the sign-in identity the first
/// time this user is seen.
pub async fn ensure_user(db: &Db, identity: User) -> Result<User, ApiError> {
    if let Some(existing) = get_user(db, &identity.user_id).await? {
        return Ok(existing);
    }

    let result = db.users().insert_one(&identity).await?;
    log::info!("Created user record for {}", identity.user_id);

    Ok(User {
        id: result.inserted_id.as_object_id(),
        ..identity
    })
}

async fn set_fields(db: &Db, user_id: &str, mut fields: Document) -> Result<User, ApiError> {
    fields.insert("updated_at", DateTime::now());
    db.users()
        .find_one_and_update(doc! { "user_id": user_id }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

pub async fn update_profile(
    db: &Db,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<User, ApiError> {
    set_fields(db, user_id, bson::to_document(update)?).await
}

pub async fn set_tags(db: &Db, user_id: &str, tags: Vec<String>) -> Result<User, ApiError> {
    let tags = normalize_tags(tags);
    set_fields(db, user_id, doc! { "tags": tags }).await
}

pub async fn set_travel_style(
    db: &Db,
    user_id: &str,
    style: TravelStyle,
) -> Result<User, ApiError> {
    set_fields(db, user_id, doc! { "style_result": bson::to_bson(&style)? }).await
}

pub async fn set_photo_url(db: &Db, user_id: &str, url: &str) -> Result<User, ApiError> {
    set_fields(db, user_id, doc! { "photo_url": url }).await
}

pub async fn add_companion(
    db: &Db,
    user_id: &str,
    companion: &Companion,
) -> Result<User, ApiError> {
    if companion.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Companion name is required".to_string()));
    }
    db.users()
        .find_one_and_update(
            doc! { "user_id": user_id },
            doc! {
                "$push": { "companions": bson::to_bson(companion)? },
                "$set": { "updated_at": DateTime::now() },
            },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

pub async fn remove_companion_at(db: &Db, user_id: &str, index: usize) -> Result<User, ApiError> {
    let user = require_user(db, user_id).await?;
    let companions = remove_companion(user.companions, index)?;
    set_fields(db, user_id, doc! { "companions": bson::to_bson(&companions)? }).await
}

/// Toggles a post in the saved list. Returns whether it is saved afterwards.
pub async fn toggle_saved_post(db: &Db, user_id: &str, post_id: &str) -> Result<bool, ApiError> {
    let user = require_user(db, user_id).await?;
    let (saved_posts, saved) = toggle_saved(user.saved_posts, post_id);
    set_fields(db, user_id, doc! { "saved_posts": saved_posts }).await?;
    Ok(saved)
}

/// Saved posts in the order they were saved. Ids that no longer resolve are
/// skipped.
pub async fn saved_posts(db: &Db, user_id: &str) -> Result<Vec<Post>, ApiError> {
    let user = require_user(db, user_id).await?;
    let ids: Vec<ObjectId> = user
        .saved_posts
        .iter()
        .filter_map(|id| ObjectId::parse_str(id).ok())
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let posts: Vec<Post> = db
        .posts()
        .find(doc! { "_id": { "$in": ids.clone() } })
        .await?
        .try_collect()
        .await?;

    Ok(ids
        .iter()
        .filter_map(|id| posts.iter().find(|post| post.id.as_ref() == Some(id)).cloned())
        .collect())
}

/// Removes one companion; the rest keep their relative order.
pub fn remove_companion(
    mut companions: Vec<Companion>,
    index: usize,
) -> Result<Vec<Companion>, ApiError> {
    if index >= companions.len() {
        return Err(ApiError::BadRequest("Companion index out of range".to_string()));
    }
    companions.remove(index);
    Ok(companions)
}

pub fn toggle_saved(mut saved: Vec<String>, post_id: &str) -> (Vec<String>, bool) {
    match saved.iter().position(|id| id == post_id) {
        Some(position) => {
            saved.remove(position);
            (saved, false)
        }
        None => {
            saved.push(post_id.to_string());
            (saved, true)
        }
    }
}

/// Trims, drops empties and duplicates, keeps first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
