use actix_web::{web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::models::analytics::LogEntry;
use crate::services::booking_service::{self, BookingRequest};
use crate::services::{analytics_store, catalog_store};

/*
    /api/log
*/
pub async fn log_event(
    db: web::Data<Db>,
    body: web::Json<LogEntry>,
) -> Result<HttpResponse, ApiError> {
    analytics_store::record_event(&db, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "captured" })))
}

/*
    /api/spots/{id}
*/
pub async fn get_spot(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = ObjectId::parse_str(path.into_inner().as_str())?;
    Ok(HttpResponse::Ok().json(catalog_store::get_spot(&db, id).await?))
}

/*
    /api/videos
*/
pub async fn list_videos(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog_store::list_public_videos(&db).await?))
}

/*
    /api/videos/{id}
*/
pub async fn get_video(
    db: web::Data<Db>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = ObjectId::parse_str(path.into_inner().as_str())?;
    Ok(HttpResponse::Ok().json(catalog_store::get_video(&db, id).await?))
}

/*
    /api/booking/instant
    Mock flow; nothing is reserved.
*/
pub async fn instant_booking(body: web::Json<BookingRequest>) -> Result<HttpResponse, ApiError> {
    let response = booking_service::run(&body)?;
    Ok(HttpResponse::Ok().json(response))
}
