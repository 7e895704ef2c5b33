use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::routes::oauth_state::{self, SPOTIFY_STATE_COOKIE};
use crate::services::spotify_service::{
    SpotifyService, SpotifyTokens, SpotifyUserData, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};

const DEFAULT_ACCESS_MAX_AGE: i64 = 3600;
const REFRESH_MAX_AGE_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct SpotifyCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub state: Option<String>,
}

fn token_cookie(name: &'static str, value: String, max_age: CookieDuration) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

fn set_token_cookies(response: &mut actix_web::HttpResponseBuilder, tokens: SpotifyTokens) {
    let access_max_age = tokens
        .expires_in
        .map(|secs| secs as i64)
        .unwrap_or(DEFAULT_ACCESS_MAX_AGE);
    response.cookie(token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token,
        CookieDuration::seconds(access_max_age),
    ));
    if let Some(refresh_token) = tokens.refresh_token {
        response.cookie(token_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token,
            CookieDuration::days(REFRESH_MAX_AGE_DAYS),
        ));
    }
}

/// `{frontend}/plan?{query}`
pub fn plan_redirect(frontend_url: &str, query: &str) -> String {
    format!("{}/plan?{}", frontend_url.trim_end_matches('/'), query)
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/*
    /api/spotify/auth-url
*/
pub async fn auth_url(spotify: web::Data<SpotifyService>) -> Result<HttpResponse, ApiError> {
    let (url, csrf_token) = spotify.auth_url()?;
    Ok(HttpResponse::Ok()
        .cookie(oauth_state::state_cookie(SPOTIFY_STATE_COOKIE, &csrf_token))
        .json(json!({ "url": url.to_string() })))
}

/*
    /api/spotify/callback
    Always ends in a redirect back to the planner; failures travel in the
    `error` query parameter.
*/
pub async fn callback(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    spotify: web::Data<SpotifyService>,
    query: web::Query<SpotifyCallbackParams>,
) -> HttpResponse {
    let query = query.into_inner();
    if let Some(error) = query.error {
        log::warn!("Spotify authorization declined: {}", error);
        return redirect(plan_redirect(&config.frontend_url, "error=spotify_access_denied"));
    }
    let Some(code) = query.code else {
        return redirect(plan_redirect(&config.frontend_url, "error=no_code"));
    };
    if !oauth_state::state_matches(&req, SPOTIFY_STATE_COOKIE, query.state.as_deref()) {
        log::warn!("Spotify callback state did not match the stored cookie");
        return redirect(plan_redirect(&config.frontend_url, "error=spotify_state_mismatch"));
    }

    match spotify.exchange_code(code).await {
        Ok(tokens) => {
            let mut response = HttpResponse::Found();
            response.insert_header((
                header::LOCATION,
                plan_redirect(&config.frontend_url, "spotify_connected=true"),
            ));
            response.cookie(oauth_state::clear_state_cookie(SPOTIFY_STATE_COOKIE));
            set_token_cookies(&mut response, tokens);
            response.finish()
        }
        Err(e) => {
            log::error!("Spotify callback failed: {}", e);
            redirect(plan_redirect(&config.frontend_url, "error=spotify_callback_failed"))
        }
    }
}

/*
    /api/spotify/me
*/
pub async fn me(req: HttpRequest, spotify: web::Data<SpotifyService>) -> HttpResponse {
    let data = match req.cookie(ACCESS_TOKEN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => spotify.user_data(cookie.value()).await,
        _ => SpotifyUserData::disconnected(),
    };
    HttpResponse::Ok().json(data)
}

/*
    /api/spotify/refresh
*/
pub async fn refresh(
    req: HttpRequest,
    spotify: web::Data<SpotifyService>,
) -> Result<HttpResponse, ApiError> {
    let refresh_token = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let tokens = spotify.refresh(refresh_token).await?;
    let mut response = HttpResponse::Ok();
    set_token_cookies(&mut response, tokens);
    Ok(response.json(json!({ "refreshed": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_redirect_joins_frontend_once() {
        assert_eq!(
            plan_redirect("http://localhost:3000/", "spotify_connected=true"),
            "http://localhost:3000/plan?spotify_connected=true"
        );
    }

    #[test]
    fn cookies_are_locked_down() {
        let cookie = token_cookie(ACCESS_TOKEN_COOKIE, "abc".to_string(), CookieDuration::seconds(60));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(60)));
    }
}
