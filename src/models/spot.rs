use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricePoint {
    pub date: DateTime,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AffiliateLink {
    pub provider: String,
    pub url: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Spot {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
    #[serde(default)]
    pub affiliate_links: Vec<AffiliateLink>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
