use std::env;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE: &str = "Mirutabi";
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";
const FRONTEND_URL: &str = "http://localhost:3000";

/// Runtime settings read from the environment.
///
/// `MONGODB_URI` and `JWT_SECRET` are mandatory. Every external key is optional: an adapter
/// built without its key reports itself as not configured and the endpoints
/// that depend on it answer with an error instead of the server refusing to
/// start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    pub jwt_secret: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub google_maps_api_key: Option<String>,
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: Option<String>,
    pub public_base_url: String,
    pub frontend_url: String,
    pub media_bucket: Option<String>,
    pub cors_origins: Vec<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongo_uri = env::var("MONGODB_URI").map_err(|_| ConfigError::Missing("MONGODB_URI"))?;
        let jwt_secret = optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(PORT);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|origins| parse_list(&origins))
            .unwrap_or_else(|_| vec![FRONTEND_URL.to_string()]);

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port,
            mongo_uri,
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| DATABASE.to_string()),
            jwt_secret,
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| GEMINI_MODEL.to_string()),
            google_maps_api_key: optional("GOOGLE_MAPS_API_KEY"),
            spotify_client_id: optional("SPOTIFY_CLIENT_ID"),
            spotify_client_secret: optional("SPOTIFY_CLIENT_SECRET"),
            google_client_id: optional("GOOGLE_CLIENT_ID"),
            google_client_secret: optional("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: optional("GOOGLE_REDIRECT_URI"),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| PUBLIC_BASE_URL.to_string()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| FRONTEND_URL.to_string()),
            media_bucket: optional("MEDIA_BUCKET"),
            cors_origins,
        })
    }

    /// Settings for tests and tools that never reach external services.
    pub fn for_tests() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: format!("{}Test", DATABASE),
            jwt_secret: "test_secret".to_string(),
            gemini_api_key: None,
            gemini_model: GEMINI_MODEL.to_string(),
            google_maps_api_key: None,
            spotify_client_id: None,
            spotify_client_secret: None,
            google_client_id: None,
            google_client_secret: None,
            google_redirect_uri: None,
            public_base_url: PUBLIC_BASE_URL.to_string(),
            frontend_url: FRONTEND_URL.to_string(),
            media_bucket: None,
            cors_origins: vec![FRONTEND_URL.to_string()],
        }
    }

    pub fn spotify_redirect_uri(&self) -> String {
        format!(
            "{}/api/spotify/callback",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

// Empty values count as unset so a blank line in .env does not enable a feature.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn missing_jwt_secret_is_rejected() {
        env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        for value in [None, Some("  ")] {
            match value {
                Some(v) => env::set_var("JWT_SECRET", v),
                None => env::remove_var("JWT_SECRET"),
            }
            let result = AppConfig::from_env();
            assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
        }

        env::set_var("JWT_SECRET", "s3cret");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
        env::remove_var("JWT_SECRET");
    }

    #[test]
    fn parse_list_skips_blanks() {
        assert_eq!(
            parse_list("http://a.test, ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn spotify_redirect_uri_joins_base_once() {
        let mut config = AppConfig::for_tests();
        config.public_base_url = "https://mirutabi.com/".to_string();
        assert_eq!(
            config.spotify_redirect_uri(),
            "https://mirutabi.com/api/spotify/callback"
        );
    }
}
