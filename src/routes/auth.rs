use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::config::AppConfig;
use crate::db::mongo::Db;
use crate::error::ApiError;
use crate::middleware::auth::issue_token;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::google_auth::GoogleAuthCallbackParams;
use crate::models::user::User;
use crate::routes::oauth_state::{self, GOOGLE_STATE_COOKIE};
use crate::services::google_auth_service::GoogleAuthService;
use crate::services::user_store;

/*
    /api/auth/google
*/
pub async fn google_auth_init(
    google: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, ApiError> {
    let (auth_url, csrf_token) = google.auth_url()?;
    log::debug!("Redirecting to Google sign-in");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, auth_url.to_string()))
        .cookie(oauth_state::state_cookie(GOOGLE_STATE_COOKIE, &csrf_token))
        .finish())
}

/*
    /api/auth/google/callback
*/
pub async fn google_auth_callback(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    db: web::Data<Db>,
    google: web::Data<GoogleAuthService>,
    query: web::Query<GoogleAuthCallbackParams>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    if let Some(error) = query.error {
        log::warn!("Google OAuth error: {}", error);
        return Err(ApiError::BadRequest(format!("OAuth error: {}", error)));
    }
    if !oauth_state::state_matches(&req, GOOGLE_STATE_COOKIE, query.state.as_deref()) {
        log::warn!("Google callback state did not match the stored cookie");
        return Err(ApiError::BadRequest("Invalid OAuth state".to_string()));
    }
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Missing authorization code".to_string()))?;

    let access_token = google.exchange_code(code).await?;
    let info = google.user_info(&access_token).await?;
    log::info!("Google sign-in for {}", info.email);

    let user = user_store::ensure_user(
        &db,
        User::new_from_identity(
            info.id,
            Some(info.email.clone()),
            info.name,
            info.picture,
        ),
    )
    .await?;

    let token = issue_token(&info.email, &user.user_id, &config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))?;

    let redirect_url = format!(
        "{}/?token={}",
        config.frontend_url.trim_end_matches('/'),
        token
    );
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, redirect_url))
        .cookie(oauth_state::clear_state_cookie(GOOGLE_STATE_COOKIE))
        .finish())
}

/*
    /api/auth/session
*/
pub async fn user_session(
    db: web::Data<Db>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let record = user_store::get_user(&db, &user.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user.user_id,
        "email": user.email,
        "user": record,
    })))
}
