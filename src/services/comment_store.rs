use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::comment::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Route(ObjectId),
    Post(ObjectId),
}

impl CommentTarget {
    fn field(&self) -> (&'static str, String) {
        match self {
            CommentTarget::Route(id) => ("route_id", id.to_hex()),
            CommentTarget::Post(id) => ("post_id", id.to_hex()),
        }
    }
}

pub struct Commenter {
    pub user_id: String,
    pub name: String,
    pub image: Option<String>,
}

pub fn new_comment(
    target: CommentTarget,
    author: Commenter,
    content: &str,
) -> Result<Comment, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Comment cannot be empty".to_string()));
    }

    let (route_id, post_id) = match target {
        CommentTarget::Route(id) => (Some(id.to_hex()), None),
        CommentTarget::Post(id) => (None, Some(id.to_hex())),
    };

    Ok(Comment {
        id: None,
        route_id,
        post_id,
        user_id: author.user_id,
        user_name: author.name,
        user_image: author.image,
        content: content.to_string(),
        created_at: DateTime::now(),
    })
}

pub async fn add_comment(
    db: &Db,
    target: CommentTarget,
    author: Commenter,
    content: &str,
) -> Result<Comment, ApiError> {
    let comment = new_comment(target, author, content)?;
    let result = db.comments().insert_one(&comment).await?;

    Ok(Comment {
        id: result.inserted_id.as_object_id(),
        ..comment
    })
}

/// Newest first.
pub async fn list_comments(db: &Db, target: CommentTarget) -> Result<Vec<Comment>, ApiError> {
    let (field, id) = target.field();
    Ok(db
        .comments()
        .find(doc! { field: id })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect()
        .await?)
}
