#![allow(dead_code)]

use actix_web::{middleware::Logger, web, App};

use mirutabi_api::config::AppConfig;
use mirutabi_api::db::mongo::{create_mongo_client, Db};
use mirutabi_api::middleware::auth::issue_token;
use mirutabi_api::routes;
use mirutabi_api::services::gemini_service::GeminiService;
use mirutabi_api::services::google_auth_service::GoogleAuthService;
use mirutabi_api::services::media_service::MediaService;
use mirutabi_api::services::places_service::GooglePlacesService;
use mirutabi_api::services::spotify_service::SpotifyService;
use mirutabi_api::services::weather_service::WeatherService;

pub struct TestApp {
    pub config: AppConfig,
    pub db: Db,
}

impl TestApp {
    /// App over a lazily connected client. Nothing talks to MongoDB until a
    /// handler actually queries it.
    pub async fn new() -> Self {
        let config = AppConfig::for_tests();
        let client = mongodb::Client::with_uri_str(&config.mongo_uri)
            .await
            .expect("valid test MongoDB URI");
        let db = Db::new(std::sync::Arc::new(client), config.database.clone());
        Self { config, db }
    }

    /// App over a real MongoDB from `MONGODB_URI`.
    pub async fn with_database() -> Self {
        let mut config = AppConfig::for_tests();
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.mongo_uri = uri;
        }
        let client = create_mongo_client(&config.mongo_uri)
            .await
            .expect("MongoDB reachable");
        let db = Db::new(client, config.database.clone());
        Self { config, db }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        issue_token(&format!("{}@example.com", user_id), user_id, &self.config.jwt_secret)
            .expect("token")
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<
                impl actix_web::body::MessageBody,
            >,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let secret = self.config.jwt_secret.clone();
        App::new()
            .wrap(Logger::default())
            .app_data(routes::json_config())
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.db.clone()))
            .app_data(web::Data::new(GeminiService::new(None, "gemini-test")))
            .app_data(web::Data::new(GooglePlacesService::new(None)))
            .app_data(web::Data::new(WeatherService::new()))
            .app_data(web::Data::new(SpotifyService::from_config(&self.config)))
            .app_data(web::Data::new(GoogleAuthService::from_config(&self.config)))
            .app_data(web::Data::new(MediaService::disabled()))
            .route("/health", web::get().to(routes::health::health_check))
            .configure(move |cfg| routes::configure_api(cfg, &secret))
    }
}
