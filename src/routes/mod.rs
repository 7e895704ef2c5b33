use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpRequest};
use futures::TryStreamExt;

use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::services::media_service::{self, MediaUploadError, UploadedFile};
use crate::services::user_store;

pub mod auth;
pub mod health;
pub mod itinerary;
pub mod misc;
pub mod oauth_state;
pub mod plans;
pub mod posts;
pub mod spotify;
pub mod users;

const UPLOAD_FIELD: &str = "file";
/// Vision requests carry base64 photos inline.
const JSON_LIMIT: usize = 20 * 1024 * 1024;

/// JSON extractor settings: large bodies allowed, and malformed bodies answer
/// with the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// Display name and picture stamped onto routes, posts and comments.
pub(crate) async fn author_profile(
    db: &Db,
    user: &AuthenticatedUser,
) -> Result<(String, Option<String>), ApiError> {
    let record = user_store::get_user(db, &user.user_id).await?;
    let fallback = user
        .email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();

    Ok(match record {
        Some(record) => (
            record.display_name.unwrap_or(fallback),
            record.photo_url,
        ),
        None => (fallback, None),
    })
}

/// Reads the `file` field of a multipart body, logging progress against the
/// declared Content-Length.
pub(crate) async fn read_upload(
    req: &HttpRequest,
    mut payload: Multipart,
    user_id: &str,
) -> Result<UploadedFile, ApiError> {
    let declared_len = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| MediaUploadError::InvalidUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let progress = media_service::logging_progress(user_id.to_string());
        let upload = media_service::read_field(&mut field, declared_len, progress).await?;
        return Ok(upload);
    }

    Err(ApiError::BadRequest("Missing file field".to_string()))
}

/// The whole `/api` surface. Public GET routes are registered ahead of the
/// token-guarded scope that shares their prefix.
pub fn configure_api(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/google", web::get().to(auth::google_auth_init))
                    .route("/google/callback", web::get().to(auth::google_auth_callback))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(jwt_secret))
                            .route("/session", web::get().to(auth::user_session)),
                    ),
            )
            // Public routes
            .route("/log", web::post().to(misc::log_event))
            .route("/weather", web::get().to(plans::weather))
            .route("/booking/instant", web::post().to(misc::instant_booking))
            .route("/diagnosis/questions", web::get().to(users::diagnosis_questions))
            .route("/diagnosis", web::post().to(users::submit_diagnosis))
            .service(
                web::scope("/plans")
                    .route("/generate", web::post().to(plans::generate_plan))
                    .route("/chat", web::post().to(plans::chat))
                    .route("/timeline", web::post().to(plans::edit_timeline)),
            )
            .service(
                web::scope("/vision")
                    .route("/location", web::post().to(plans::analyze_location))
                    .route("/trip", web::post().to(plans::analyze_trip_images)),
            )
            .service(
                web::scope("/hotels")
                    .route("/deck", web::get().to(plans::hotel_deck))
                    .route("/analyze", web::post().to(plans::analyze_hotels)),
            )
            .service(
                web::scope("/spotify")
                    .route("/auth-url", web::get().to(spotify::auth_url))
                    .route("/callback", web::get().to(spotify::callback))
                    .route("/me", web::get().to(spotify::me))
                    .route("/refresh", web::post().to(spotify::refresh)),
            )
            .route("/spots/{id}", web::get().to(misc::get_spot))
            .route("/videos", web::get().to(misc::list_videos))
            .route("/videos/{id}", web::get().to(misc::get_video))
            .route("/users/{user_id}/posts", web::get().to(users::user_posts))
            .service(
                web::scope("/users/me")
                    .wrap(AuthMiddleware::new(jwt_secret))
                    .route("", web::get().to(users::get_profile))
                    .route("", web::put().to(users::update_profile))
                    .route("/tags", web::put().to(users::set_tags))
                    .route("/companions", web::post().to(users::add_companion))
                    .route("/companions/{index}", web::delete().to(users::remove_companion))
                    .route("/photo", web::put().to(users::upload_profile_image))
                    .route("/saved", web::get().to(users::saved_posts)),
            )
            .service(
                web::scope("/routes")
                    .route("/public", web::get().to(itinerary::list_public))
                    .service(
                        web::resource("/mine")
                            .wrap(AuthMiddleware::new(jwt_secret))
                            .route(web::get().to(itinerary::list_mine)),
                    )
                    .route("/{id}", web::get().to(itinerary::get_by_id))
                    .route("/{id}/comments", web::get().to(itinerary::list_comments))
                    .route("/{id}/reuse", web::post().to(itinerary::reuse))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(jwt_secret))
                            .route("", web::post().to(itinerary::save_route))
                            .route("/{id}", web::put().to(itinerary::update))
                            .route("/{id}", web::delete().to(itinerary::delete))
                            .route("/{id}/like", web::post().to(itinerary::toggle_like))
                            .route("/{id}/like", web::get().to(itinerary::like_status))
                            .route("/{id}/comments", web::post().to(itinerary::add_comment))
                            .route("/{id}/images", web::post().to(itinerary::upload_image)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::feed))
                    .route("/reels", web::get().to(posts::reels))
                    .route("/{id}", web::get().to(posts::get_by_id))
                    .route("/{id}/comments", web::get().to(posts::list_comments))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(jwt_secret))
                            .route("", web::post().to(posts::create))
                            .route("/upload", web::post().to(posts::upload_media))
                            .route("/{id}", web::put().to(posts::update))
                            .route("/{id}", web::delete().to(posts::delete))
                            .route("/{id}/like", web::post().to(posts::toggle_like))
                            .route("/{id}/like", web::get().to(posts::like_status))
                            .route("/{id}/save", web::post().to(posts::toggle_save))
                            .route("/{id}/comments", web::post().to(posts::add_comment)),
                    ),
            ),
    );
}
