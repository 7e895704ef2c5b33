use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::comment::CommentRequest;
use crate::models::post::{CreatePostRequest, PostUpdate};
use crate::routes::{author_profile, read_upload};
use crate::services::comment_store::{self, CommentTarget, Commenter};
use crate::services::media_service::{self, MediaService};
use crate::services::post_store::{self, PostAuthor};
use crate::services::user_store;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

fn post_id(path: web::Path<String>) -> Result<ObjectId, ApiError> {
    Ok(ObjectId::parse_str(path.into_inner().as_str())?)
}

/*
    /api/posts
*/
pub async fn feed(
    db: web::Data<Db>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let posts = post_store::list_posts(&db, query.limit).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/*
    /api/posts/reels
*/
pub async fn reels(
    db: web::Data<Db>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let posts = post_store::list_reels(&db, query.limit).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/*
    /api/posts/{id}
*/
pub async fn get_by_id(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post = post_store::get_post(&db, post_id(path)?).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    let (name, image) = author_profile(&db, &user).await?;
    let author = PostAuthor {
        user_id: user.user_id,
        name,
        image,
    };
    let post = post_store::create_post(&db, author, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn update(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<PostUpdate>,
) -> Result<HttpResponse, ApiError> {
    let post = post_store::update_post(&db, post_id(path)?, &user.user_id, &body).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete(
    db: web::Data<Db>,
    media: web::Data<MediaService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    post_store::delete_post(&db, &media, post_id(path)?, &user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/*
    /api/posts/upload (multipart, field "file")
    Stores the media object only; the client then creates the post with the
    returned URL.
*/
pub async fn upload_media(
    req: HttpRequest,
    payload: Multipart,
    media: web::Data<MediaService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(&req, payload, &user.user_id).await?;
    let object = media_service::post_object_path(
        &user.user_id,
        Utc::now().timestamp_millis(),
        &upload.filename,
    );
    let url = media.upload(&object, upload.bytes, &upload.content_type).await?;
    Ok(HttpResponse::Created().json(json!({ "url": url, "content_type": upload.content_type })))
}

/*
    /api/posts/{id}/like
*/
pub async fn toggle_like(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let state = post_store::toggle_post_like(&db, post_id(path)?, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(state))
}

pub async fn like_status(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let liked = post_store::post_like_status(&db, post_id(path)?, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "liked": liked })))
}

/*
    /api/posts/{id}/save
*/
pub async fn toggle_save(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path)?;
    post_store::get_post(&db, id).await?;
    let saved = user_store::toggle_saved_post(&db, &user.user_id, &id.to_hex()).await?;
    Ok(HttpResponse::Ok().json(json!({ "saved": saved })))
}

/*
    /api/posts/{id}/comments
*/
pub async fn list_comments(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let comments = comment_store::list_comments(&db, CommentTarget::Post(post_id(path)?)).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn add_comment(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = post_id(path)?;
    post_store::get_post(&db, id).await?;

    let (name, image) = author_profile(&db, &user).await?;
    let commenter = Commenter {
        user_id: user.user_id,
        name,
        image,
    };
    let comment =
        comment_store::add_comment(&db, CommentTarget::Post(id), commenter, &body.content).await?;
    Ok(HttpResponse::Created().json(comment))
}
