use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;
use crate::error::ApiError;

const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const SCOPES: [&str; 3] = ["user-read-private", "user-read-email", "user-top-read"];

pub const ACCESS_TOKEN_COOKIE: &str = "spotify_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "spotify_refresh_token";

#[derive(Debug, Clone)]
pub struct SpotifyTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyUserData {
    pub is_connected: bool,
    pub top_artists: Vec<String>,
    pub top_tracks: Vec<String>,
}

impl SpotifyUserData {
    pub fn disconnected() -> Self {
        Self {
            is_connected: false,
            top_artists: Vec::new(),
            top_tracks: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Paging<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

impl Track {
    fn label(&self) -> String {
        match self.artists.first() {
            Some(artist) => format!("{} by {}", self.name, artist.name),
            None => self.name.clone(),
        }
    }
}

/// Authorization-code flow against Spotify accounts plus the two "top"
/// listings used as music taste in concierge mode.
#[derive(Clone)]
pub struct SpotifyService {
    oauth: Option<BasicClient>,
    http: Client,
}

impl SpotifyService {
    pub fn from_config(config: &AppConfig) -> Self {
        let oauth = match (&config.spotify_client_id, &config.spotify_client_secret) {
            (Some(id), Some(secret)) => {
                match create_spotify_oauth_client(id, secret, &config.spotify_redirect_uri()) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        log::error!("Invalid Spotify OAuth settings: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        Self {
            oauth,
            http: Client::new(),
        }
    }

    fn oauth(&self) -> Result<&BasicClient, ApiError> {
        self.oauth.as_ref().ok_or(ApiError::NotConfigured("Spotify"))
    }

    pub fn is_configured(&self) -> bool {
        self.oauth.is_some()
    }

    /// Authorization URL plus the `state` the callback must echo back.
    pub fn auth_url(&self) -> Result<(Url, CsrfToken), ApiError> {
        Ok(self
            .oauth()?
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .url())
    }

    pub async fn exchange_code(&self, code: String) -> Result<SpotifyTokens, ApiError> {
        let token = self
            .oauth()?
            .exchange_code(AuthorizationCode::new(code))
            .request_async(async_http_client)
            .await
            .map_err(|e| ApiError::Upstream(format!("Spotify token error: {}", e)))?;

        Ok(SpotifyTokens {
            access_token: token.access_token().secret().clone(),
            refresh_token: token.refresh_token().map(|t| t.secret().clone()),
            expires_in: token.expires_in().map(|d| d.as_secs()),
        })
    }

    pub async fn refresh(&self, refresh_token: String) -> Result<SpotifyTokens, ApiError> {
        let token = self
            .oauth()?
            .exchange_refresh_token(&RefreshToken::new(refresh_token.clone()))
            .request_async(async_http_client)
            .await
            .map_err(|e| ApiError::Upstream(format!("Failed to refresh token: {}", e)))?;

        Ok(SpotifyTokens {
            access_token: token.access_token().secret().clone(),
            // Spotify may omit the refresh token on refresh; keep the old one.
            refresh_token: token
                .refresh_token()
                .map(|t| t.secret().clone())
                .or(Some(refresh_token)),
            expires_in: token.expires_in().map(|d| d.as_secs()),
        })
    }

    async fn top<T: for<'de> Deserialize<'de>>(&self, access_token: &str, kind: &str) -> Vec<T> {
        let url = format!("{}/me/top/{}?limit=5", SPOTIFY_API_URL, kind);
        let response = match self.http.get(&url).bearer_auth(access_token).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                log::warn!("Spotify top {} returned {}", kind, response.status());
                return Vec::new();
            }
            Err(e) => {
                log::error!("Spotify top {} failed: {}", kind, e);
                return Vec::new();
            }
        };

        match response.json::<Paging<T>>().await {
            Ok(page) => page.items,
            Err(e) => {
                log::error!("Spotify top {} unreadable: {}", kind, e);
                Vec::new()
            }
        }
    }

    pub async fn top_artists(&self, access_token: &str) -> Vec<String> {
        self.top::<Artist>(access_token, "artists")
            .await
            .into_iter()
            .map(|artist| artist.name)
            .collect()
    }

    pub async fn top_tracks(&self, access_token: &str) -> Vec<String> {
        self.top::<Track>(access_token, "tracks")
            .await
            .iter()
            .map(Track::label)
            .collect()
    }

    pub async fn user_data(&self, access_token: &str) -> SpotifyUserData {
        let (top_artists, top_tracks) = tokio::join!(
            self.top_artists(access_token),
            self.top_tracks(access_token)
        );
        SpotifyUserData {
            is_connected: true,
            top_artists,
            top_tracks,
        }
    }
}

fn create_spotify_oauth_client(
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> Result<BasicClient, url::ParseError> {
    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        Some(ClientSecret::new(client_secret.to_string())),
        AuthUrl::new(SPOTIFY_AUTH_URL.to_string())?,
        Some(TokenUrl::new(SPOTIFY_TOKEN_URL.to_string())?),
    )
    .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?))
}
