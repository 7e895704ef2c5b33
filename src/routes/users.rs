use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::middleware::auth_context::{AuthenticatedUser, MaybeUser};
use crate::models::user::{Companion, ProfileUpdate};
use crate::routes::read_upload;
use crate::services::diagnosis_service::{self, DiagnosisAnswers, DiagnosisResult};
use crate::services::media_service::{self, MediaService};
use crate::services::{post_store, user_store};

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

/*
    /api/users/me
*/
pub async fn get_profile(
    db: web::Data<Db>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let record = user_store::get_user(&db, &user.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_profile(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let updated = user_store::update_profile(&db, &user.user_id, &body).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/*
    /api/users/me/tags
*/
pub async fn set_tags(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    body: web::Json<TagsRequest>,
) -> Result<HttpResponse, ApiError> {
    let updated = user_store::set_tags(&db, &user.user_id, body.into_inner().tags).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/*
    /api/users/me/companions
*/
pub async fn add_companion(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    body: web::Json<Companion>,
) -> Result<HttpResponse, ApiError> {
    let updated = user_store::add_companion(&db, &user.user_id, &body).await?;
    Ok(HttpResponse::Created().json(updated))
}

/*
    /api/users/me/companions/{index}
*/
pub async fn remove_companion(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<usize>,
) -> Result<HttpResponse, ApiError> {
    let updated = user_store::remove_companion_at(&db, &user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/*
    /api/users/me/photo (multipart, field "file")
*/
pub async fn upload_profile_image(
    req: HttpRequest,
    payload: Multipart,
    db: web::Data<Db>,
    media: web::Data<MediaService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(&req, payload, &user.user_id).await?;
    let object = media_service::profile_object_path(&user.user_id);
    let url = media.upload(&object, upload.bytes, &upload.content_type).await?;

    let updated = user_store::set_photo_url(&db, &user.user_id, &url).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/*
    /api/users/me/saved
*/
pub async fn saved_posts(
    db: web::Data<Db>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let posts = user_store::saved_posts(&db, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/*
    /api/users/{user_id}/posts
*/
pub async fn user_posts(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let posts = post_store::list_user_posts(&db, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/*
    /api/diagnosis/questions
*/
pub async fn diagnosis_questions() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "questions": diagnosis_service::questions() }))
}

/*
    /api/diagnosis
    Anonymous visitors get their result back; signed-in users also have it
    stored on their profile.
*/
pub async fn submit_diagnosis(
    db: web::Data<Db>,
    user: MaybeUser,
    body: web::Json<DiagnosisAnswers>,
) -> Result<HttpResponse, ApiError> {
    let (style, total_score) = diagnosis_service::diagnose(&body.answers)?;

    let saved = match user.0 {
        Some(user) => {
            user_store::set_travel_style(&db, &user.user_id, style).await?;
            log::info!("Stored travel style {} for {}", style.label(), user.user_id);
            true
        }
        None => false,
    };

    Ok(HttpResponse::Ok().json(DiagnosisResult {
        style,
        total_score,
        description: style.description(),
        saved,
    }))
}
