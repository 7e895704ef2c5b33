use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::models::hotel::HotelSwipeRequest;
use crate::models::plan::{ChatRequest, PlanRequest, TimelineRequest};
use crate::services::gemini_service::GeminiService;
use crate::services::places_service::GooglePlacesService;
use crate::services::weather_service::WeatherService;
use crate::services::{chat_service, hotel_service, plan_service, vision_service};

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct TripImagesRequest {
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
}

/*
    /api/plans/generate
*/
pub async fn generate_plan(
    gemini: web::Data<GeminiService>,
    places: web::Data<GooglePlacesService>,
    body: web::Json<PlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let stops = plan_service::generate_plan(gemini.get_ref(), places.get_ref(), &body).await?;
    log::info!("Generated plan with {} stops", stops.len());

    let summary = plan_service::summarize(&stops);
    Ok(HttpResponse::Ok().json(json!({ "stops": stops, "summary": summary })))
}

/*
    /api/plans/chat
*/
pub async fn chat(
    gemini: web::Data<GeminiService>,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = chat_service::chat_with_plan(gemini.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/*
    /api/plans/timeline
    Reorders or swaps locally; nothing is persisted until the route is saved.
*/
pub async fn edit_timeline(body: web::Json<TimelineRequest>) -> Result<HttpResponse, ApiError> {
    let TimelineRequest { stops, edit } = body.into_inner();
    let response = plan_service::apply_timeline_edit(stops, &edit)?;
    Ok(HttpResponse::Ok().json(response))
}

/*
    /api/vision/location
*/
pub async fn analyze_location(
    gemini: web::Data<GeminiService>,
    body: web::Json<ImageRequest>,
) -> HttpResponse {
    let guess = vision_service::analyze_image_for_location(gemini.get_ref(), &body.image).await;
    HttpResponse::Ok().json(json!({ "location": guess }))
}

/*
    /api/vision/trip
*/
pub async fn analyze_trip_images(
    gemini: web::Data<GeminiService>,
    body: web::Json<TripImagesRequest>,
) -> Result<HttpResponse, ApiError> {
    if body.images.is_empty() {
        return Err(ApiError::BadRequest("At least one image is required".to_string()));
    }
    let spots = vision_service::analyze_images_for_trip(gemini.get_ref(), &body.images).await;
    Ok(HttpResponse::Ok().json(json!({ "spots": spots })))
}

/*
    /api/hotels/deck
*/
pub async fn hotel_deck() -> HttpResponse {
    HttpResponse::Ok().json(hotel_service::hotel_deck())
}

/*
    /api/hotels/analyze
*/
pub async fn analyze_hotels(
    gemini: web::Data<GeminiService>,
    body: web::Json<HotelSwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    let liked = hotel_service::resolve_liked(body.into_inner());
    if liked.is_empty() {
        return Err(ApiError::BadRequest("Like at least one hotel".to_string()));
    }
    let analysis = hotel_service::analyze_hotel_preferences(gemini.get_ref(), &liked).await;
    Ok(HttpResponse::Ok().json(json!({ "analysis": analysis })))
}

/*
    /api/weather?city=...
*/
pub async fn weather(
    weather: web::Data<WeatherService>,
    query: web::Query<WeatherQuery>,
) -> Result<HttpResponse, ApiError> {
    let city = query.city.trim();
    if city.is_empty() {
        return Err(ApiError::BadRequest("city is required".to_string()));
    }
    let data = weather.get_weather(city).await;
    Ok(HttpResponse::Ok().json(json!({ "weather": data })))
}
