use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;
use oauth2::CsrfToken;

pub const GOOGLE_STATE_COOKIE: &str = "mirutabi_google_oauth_state";
pub const SPOTIFY_STATE_COOKIE: &str = "mirutabi_spotify_oauth_state";

const STATE_MAX_AGE_MINUTES: i64 = 10;
const STATE_PATH: &str = "/api";

/// Short-lived cookie holding the `state` sent to the provider.
pub fn state_cookie(name: &'static str, csrf: &CsrfToken) -> Cookie<'static> {
    Cookie::build(name, csrf.secret().clone())
        .path(STATE_PATH)
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(STATE_MAX_AGE_MINUTES))
        .finish()
}

pub fn clear_state_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path(STATE_PATH).finish();
    cookie.make_removal();
    cookie
}

/// True when the callback's `state` equals the one stored before the redirect.
pub fn state_matches(req: &HttpRequest, name: &str, returned: Option<&str>) -> bool {
    match (req.cookie(name), returned) {
        (Some(stored), Some(returned)) => !stored.value().is_empty() && stored.value() == returned,
        _ => false,
    }
}
