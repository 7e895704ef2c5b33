pub mod analytics;
pub mod comment;
pub mod google_auth;
pub mod hotel;
pub mod like;
pub mod plan;
pub mod post;
pub mod route;
pub mod spot;
pub mod user;
pub mod video;
