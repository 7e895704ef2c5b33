use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::db::mongo::Db;
use crate::services::gemini_service::{GeminiService, GenerativeModel};
use crate::services::google_auth_service::GoogleAuthService;
use crate::services::media_service::MediaService;
use crate::services::places_service::GooglePlacesService;
use crate::services::spotify_service::SpotifyService;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn configured(configured: bool, missing: &str) -> Self {
        if configured {
            ServiceStatus {
                status: "ok".to_string(),
                details: None,
            }
        } else {
            ServiceStatus {
                status: "disabled".to_string(),
                details: Some(format!("{} not configured", missing)),
            }
        }
    }
}

/*
    /health
*/
pub async fn health_check(
    db: web::Data<Db>,
    gemini: web::Data<GeminiService>,
    places: web::Data<GooglePlacesService>,
    spotify: web::Data<SpotifyService>,
    google_auth: web::Data<GoogleAuthService>,
    media: web::Data<MediaService>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_result = check_mongodb(&db).await;
    if mongo_result.status != "ok" {
        health.status = "degraded".to_string();
    }
    health.services.insert("mongodb".to_string(), mongo_result);

    // Optional adapters only report; a missing key never degrades the service.
    let optional = [
        ("gemini", gemini.is_configured(), "GEMINI_API_KEY"),
        ("places", places.is_configured(), "GOOGLE_MAPS_API_KEY"),
        ("spotify", spotify.is_configured(), "SPOTIFY_CLIENT_ID/SECRET"),
        ("google_auth", google_auth.is_configured(), "GOOGLE_CLIENT_ID/SECRET/REDIRECT_URI"),
        ("cloud_storage", media.is_configured(), "MEDIA_BUCKET"),
    ];
    for (name, configured, missing) in optional {
        health
            .services
            .insert(name.to_string(), ServiceStatus::configured(configured, missing));
    }

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(db: &Db) -> ServiceStatus {
    match db.ping().await {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            log::error!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some("Failed to connect".to_string()),
            }
        }
    }
}
