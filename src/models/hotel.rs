use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub image: String,
    pub tags: Vec<String>,
    pub description: String,
    pub price_range: String,
}

/// Hotels swiped right. Either full cards or ids from the deck.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSwipeRequest {
    #[serde(default)]
    pub liked_hotels: Vec<Hotel>,
    #[serde(default)]
    pub liked_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HotelRecommendation {
    pub name: String,
    pub location: String,
    pub reason: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HotelAnalysis {
    pub personality: String,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<HotelRecommendation>,
}
