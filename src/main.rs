use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use mirutabi_api::config::AppConfig;
use mirutabi_api::db::mongo::{create_mongo_client, Db};
use mirutabi_api::routes;
use mirutabi_api::services::gemini_service::GeminiService;
use mirutabi_api::services::google_auth_service::GoogleAuthService;
use mirutabi_api::services::media_service::MediaService;
use mirutabi_api::services::places_service::GooglePlacesService;
use mirutabi_api::services::spotify_service::SpotifyService;
use mirutabi_api::services::weather_service::WeatherService;

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let client = create_mongo_client(&config.mongo_uri)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let db = web::Data::new(Db::new(client, config.database.clone()));
    log::info!("MongoDB client ready for database {}", config.database);

    let gemini = web::Data::new(GeminiService::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let places = web::Data::new(GooglePlacesService::new(config.google_maps_api_key.clone()));
    let weather = web::Data::new(WeatherService::new());
    let spotify = web::Data::new(SpotifyService::from_config(&config));
    let google_auth = web::Data::new(GoogleAuthService::from_config(&config));
    let media = web::Data::new(MediaService::from_config(&config).await);

    let host = config.host.clone();
    let port = config.port;
    let config = web::Data::new(config);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config.cors_origins))
            .wrap(Logger::default())
            .app_data(routes::json_config())
            .app_data(config.clone())
            .app_data(db.clone())
            .app_data(gemini.clone())
            .app_data(places.clone())
            .app_data(weather.clone())
            .app_data(spotify.clone())
            .app_data(google_auth.clone())
            .app_data(media.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .configure(|cfg| routes::configure_api(cfg, &config.jwt_secret))
    })
    .bind((host, port))?
    .run()
    .await
}
