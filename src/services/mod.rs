pub mod analytics_store;
pub mod booking_links;
pub mod booking_service;
pub mod catalog_store;
pub mod chat_service;
pub mod comment_store;
pub mod diagnosis_service;
pub mod gemini_service;
pub mod google_auth_service;
pub mod hotel_service;
pub mod like_store;
pub mod media_service;
pub mod model_output;
pub mod places_service;
pub mod plan_service;
pub mod post_store;
pub mod prompts;
pub mod route_store;
pub mod spotify_service;
pub mod user_store;
pub mod vision_service;
pub mod weather_service;
