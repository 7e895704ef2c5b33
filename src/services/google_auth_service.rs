use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::google_auth::GoogleUserInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Hosted Google sign-in. Without client credentials every call answers
/// `NotConfigured`.
#[derive(Clone)]
pub struct GoogleAuthService {
    client: Option<BasicClient>,
    http: ReqwestClient,
}

impl GoogleAuthService {
    pub fn from_config(config: &AppConfig) -> Self {
        let client = match (
            config.google_client_id.as_ref(),
            config.google_client_secret.as_ref(),
            config.google_redirect_uri.as_ref(),
        ) {
            (Some(id), Some(secret), Some(redirect)) => {
                match create_google_oauth_client(id, secret, redirect) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        log::error!("Invalid Google OAuth settings: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        Self {
            client,
            http: ReqwestClient::new(),
        }
    }

    fn client(&self) -> Result<&BasicClient, ApiError> {
        self.client
            .as_ref()
            .ok_or(ApiError::NotConfigured("Google sign-in"))
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn auth_url(&self) -> Result<(Url, CsrfToken), ApiError> {
        Ok(self
            .client()?
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url())
    }

    pub async fn exchange_code(&self, code: String) -> Result<String, ApiError> {
        self.client()?
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .map(|token| token.access_token().secret().clone())
            .map_err(|e| ApiError::Upstream(format!("Failed to exchange authorization code: {}", e)))
    }

    pub async fn user_info(&self, access_token: &str) -> Result<GoogleUserInfo, ApiError> {
        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Failed to request user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "Google API returned error status: {}",
                response.status()
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| ApiError::Upstream(format!("Failed to parse user info: {}", e)))
    }
}

fn create_google_oauth_client(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> Result<BasicClient, url::ParseError> {
    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        Some(ClientSecret::new(client_secret.to_string())),
        AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
        Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
    )
    .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_disable_sign_in() {
        let service = GoogleAuthService::from_config(&AppConfig::for_tests());
        assert!(matches!(
            service.auth_url(),
            Err(ApiError::NotConfigured("Google sign-in"))
        ));
    }

    #[test]
    fn auth_url_requests_profile_scopes() {
        let mut config = AppConfig::for_tests();
        config.google_client_id = Some("client".to_string());
        config.google_client_secret = Some("secret".to_string());
        config.google_redirect_uri =
            Some("http://127.0.0.1:8080/api/auth/google/callback".to_string());
        let service = GoogleAuthService::from_config(&config);

        let (url, state) = service.auth_url().unwrap();
        let query = url.query().unwrap_or_default();
        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));
        assert!(query.contains("scope=openid+email+profile"));
        assert!(query.contains(&format!("state={}", state.secret())));
    }
}
