use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, Error, FromRequest, HttpMessage, HttpRequest};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::auth::{bearer_token, decode_token, Claims};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

impl From<&Claims> for AuthenticatedUser {
    fn from(claims: &Claims) -> Self {
        AuthenticatedUser {
            user_id: claims.user_id.clone(),
            email: claims.sub.clone(),
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            ready(Ok(AuthenticatedUser::from(claims)))
        } else {
            ready(Err(ApiError::Unauthorized.into()))
        }
    }
}

/// Signed-in user when a valid bearer token is present, on routes that also
/// serve anonymous visitors.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>() {
            return ready(Ok(MaybeUser(Some(AuthenticatedUser::from(claims)))));
        }

        let secret = req
            .app_data::<web::Data<AppConfig>>()
            .map(|config| config.jwt_secret.clone());

        let user = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .zip(secret)
            .and_then(|(token, secret)| decode_token(token, &secret).ok())
            .map(|claims| AuthenticatedUser::from(&claims));

        ready(Ok(MaybeUser(user)))
    }
}
