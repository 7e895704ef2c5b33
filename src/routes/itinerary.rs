use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::middleware::auth_context::{AuthenticatedUser, MaybeUser};
use crate::models::comment::CommentRequest;
use crate::models::route::{RouteUpdate, SaveRouteRequest};
use crate::routes::{author_profile, read_upload};
use crate::services::comment_store::{self, CommentTarget, Commenter};
use crate::services::media_service::{self, MediaService};
use crate::services::route_store::{self, RouteAuthor};

fn route_id(path: web::Path<String>) -> Result<ObjectId, ApiError> {
    Ok(ObjectId::parse_str(path.into_inner().as_str())?)
}

fn viewer_id(viewer: &MaybeUser) -> Option<&str> {
    viewer.0.as_ref().map(|user| user.user_id.as_str())
}

/*
    /api/routes (save a generated plan)
*/
pub async fn save_route(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    body: web::Json<SaveRouteRequest>,
) -> Result<HttpResponse, ApiError> {
    let (name, image) = author_profile(&db, &user).await?;
    let author = RouteAuthor {
        user_id: user.user_id,
        name: Some(name),
        image,
    };
    let id = route_store::save_route(&db, author, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id.to_hex() })))
}

/*
    /api/routes/public
*/
pub async fn list_public(db: web::Data<Db>) -> Result<HttpResponse, ApiError> {
    let routes = route_store::list_public_routes(&db).await?;
    Ok(HttpResponse::Ok().json(routes))
}

/*
    /api/routes/mine
*/
pub async fn list_mine(
    db: web::Data<Db>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let routes = route_store::list_user_routes(&db, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(routes))
}

/*
    /api/routes/{id}
*/
pub async fn get_by_id(
    db: web::Data<Db>,
    viewer: MaybeUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let route = route_store::get_visible_route(&db, route_id(path)?, viewer_id(&viewer)).await?;
    Ok(HttpResponse::Ok().json(route))
}

pub async fn update(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<RouteUpdate>,
) -> Result<HttpResponse, ApiError> {
    let route =
        route_store::update_route(&db, route_id(path)?, &user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(route))
}

pub async fn delete(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    route_store::delete_route(&db, route_id(path)?, &user.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/*
    /api/routes/{id}/like
*/
pub async fn toggle_like(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    route_store::get_visible_route(&db, id, Some(&user.user_id)).await?;
    let state = route_store::toggle_route_like(&db, id, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(state))
}

pub async fn like_status(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    route_store::get_visible_route(&db, id, Some(&user.user_id)).await?;
    let liked = route_store::route_like_status(&db, id, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "liked": liked })))
}

/*
    /api/routes/{id}/reuse
*/
pub async fn reuse(
    db: web::Data<Db>,
    viewer: MaybeUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    route_store::get_visible_route(&db, id, viewer_id(&viewer)).await?;
    let route = route_store::increment_reuse(&db, id).await?;
    let stops: Vec<_> = route.stops.iter().map(|stop| stop.to_generated()).collect();
    Ok(HttpResponse::Ok().json(json!({
        "reused_count": route.reused_count,
        "stops": stops,
    })))
}

/*
    /api/routes/{id}/comments
*/
pub async fn list_comments(
    db: web::Data<Db>,
    viewer: MaybeUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    route_store::get_visible_route(&db, id, viewer_id(&viewer)).await?;
    let comments = comment_store::list_comments(&db, CommentTarget::Route(id)).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn add_comment(
    db: web::Data<Db>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    route_store::get_visible_route(&db, id, Some(&user.user_id)).await?;

    let (name, image) = author_profile(&db, &user).await?;
    let commenter = Commenter {
        user_id: user.user_id,
        name,
        image,
    };
    let comment =
        comment_store::add_comment(&db, CommentTarget::Route(id), commenter, &body.content).await?;
    Ok(HttpResponse::Created().json(comment))
}

/*
    /api/routes/{id}/images (multipart, field "file")
*/
pub async fn upload_image(
    req: HttpRequest,
    payload: Multipart,
    db: web::Data<Db>,
    media: web::Data<MediaService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = route_id(path)?;
    let route = route_store::get_route(&db, id).await?;
    if route.creator_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    let upload = read_upload(&req, payload, &user.user_id).await?;
    let object = media_service::route_object_path(
        &id.to_hex(),
        Utc::now().timestamp_millis(),
        &upload.filename,
    );
    let url = media.upload(&object, upload.bytes, &upload.content_type).await?;

    let route = route_store::add_route_image(&db, id, &user.user_id, &url).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": url, "route": route })))
}
