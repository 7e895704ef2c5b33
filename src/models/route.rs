use chrono::{DateTime as ChronoDateTime, NaiveDateTime};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::plan::{GeneratedStop, StopAlternative, StopType, ACCOMMODATION_PREFIX};
use crate::models::user::TravelStyle;

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteStop {
    pub spot_id: String,
    pub order: u32,
    #[serde(rename = "type", default)]
    pub stop_type: StopType,
    pub arrival_time: Option<NaiveDateTime>,
    pub departure_time: Option<NaiveDateTime>,
    pub stop_name: String,
    pub stop_name_en: Option<String>,
    pub stop_name_zh: Option<String>,
    pub stop_name_ko: Option<String>,
    pub notes: Option<String>,
    pub notes_en: Option<String>,
    pub notes_zh: Option<String>,
    pub notes_ko: Option<String>,
    pub cost_estimate: Option<f64>,
    pub cost_estimate_usd: Option<f64>,
    pub details: Option<String>,
    pub booking_url: Option<String>,
    pub recommended_date: Option<String>,
    pub time_zone: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<StopAlternative>,
}

/// Accepts the shapes the model actually emits: with or without seconds,
/// fractional seconds, a space separator, or a trailing offset. Offsets are
/// dropped and the local wall-clock time kept.
pub fn parse_stop_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(with_offset) = ChronoDateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    let naive = raw.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
}

fn format_stop_time(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S").to_string()
}

impl RouteStop {
    pub fn from_generated(stop: GeneratedStop) -> Self {
        let stop_name = stop.place_query();
        let notes = if stop.notes.is_empty() {
            None
        } else {
            Some(stop.notes)
        };

        Self {
            spot_id: stop.spot_id,
            order: stop.order,
            stop_type: stop.stop_type,
            arrival_time: stop.arrival_time_iso.as_deref().and_then(parse_stop_time),
            departure_time: stop.departure_time_iso.as_deref().and_then(parse_stop_time),
            stop_name,
            stop_name_en: stop.notes_en.clone(),
            stop_name_zh: stop.notes_zh.clone(),
            stop_name_ko: stop.notes_ko.clone(),
            notes,
            notes_en: stop.notes_en,
            notes_zh: stop.notes_zh,
            notes_ko: stop.notes_ko,
            cost_estimate: stop.cost_estimate,
            cost_estimate_usd: stop.cost_estimate_usd,
            details: stop.details,
            booking_url: stop.booking_url,
            recommended_date: stop.recommended_date,
            time_zone: stop.time_zone,
            image_url: stop.image_url,
            rating: stop.rating,
            address: stop.address,
            alternatives: stop.alternatives,
        }
    }

    /// Back to the shape the timeline and chat endpoints exchange.
    pub fn to_generated(&self) -> GeneratedStop {
        let notes = match (&self.notes, self.stop_type) {
            (Some(notes), _) => notes.clone(),
            (None, StopType::Accommodation) => {
                format!("{} {}", ACCOMMODATION_PREFIX, self.stop_name)
            }
            (None, _) => self.stop_name.clone(),
        };

        GeneratedStop {
            spot_id: self.spot_id.clone(),
            order: self.order,
            stop_type: self.stop_type,
            notes,
            notes_en: self.notes_en.clone(),
            notes_zh: self.notes_zh.clone(),
            notes_ko: self.notes_ko.clone(),
            arrival_time_iso: self.arrival_time.as_ref().map(format_stop_time),
            departure_time_iso: self.departure_time.as_ref().map(format_stop_time),
            cost_estimate: self.cost_estimate,
            cost_estimate_usd: self.cost_estimate_usd,
            details: self.details.clone(),
            booking_url: self.booking_url.clone(),
            recommended_date: self.recommended_date.clone(),
            time_zone: self.time_zone.clone(),
            image_url: self.image_url.clone(),
            rating: self.rating,
            address: self.address.clone(),
            alternatives: self.alternatives.clone(),
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Route {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub creator_id: String,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
    pub title: String,
    pub is_public: bool,
    #[serde(default)]
    pub likes_count: u32,
    pub travel_style_fit: Option<TravelStyle>,
    #[serde(default)]
    pub reused_count: u32,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
    pub total_budget: Option<f64>,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Body of a save: the generated (or edited) plan plus its metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveRouteRequest {
    pub title: String,
    #[serde(default)]
    pub is_public: bool,
    pub stops: Vec<GeneratedStop>,
    pub travel_style_fit: Option<TravelStyle>,
    pub total_budget: Option<f64>,
    pub duration_days: Option<u32>,
}

impl SaveRouteRequest {
    pub fn into_route(
        self,
        creator_id: String,
        author_name: Option<String>,
        author_image: Option<String>,
    ) -> Route {
        let now = DateTime::now();
        Route {
            id: None,
            creator_id,
            author_name,
            author_image,
            title: self.title,
            is_public: self.is_public,
            likes_count: 0,
            travel_style_fit: self.travel_style_fit,
            reused_count: 0,
            stops: self.stops.into_iter().map(RouteStop::from_generated).collect(),
            total_budget: self.total_budget,
            duration_days: self.duration_days,
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial route edit. Stops, when present, replace the list wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteUpdate {
    pub title: Option<String>,
    pub is_public: Option<bool>,
    pub stops: Option<Vec<GeneratedStop>>,
    pub travel_style_fit: Option<TravelStyle>,
    pub total_budget: Option<f64>,
    pub duration_days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn generated(notes: &str, arrival: Option<&str>) -> GeneratedStop {
        GeneratedStop {
            spot_id: "s1".to_string(),
            order: 1,
            stop_type: StopType::Accommodation,
            notes: notes.to_string(),
            notes_en: Some("Hotel Sunroute Plaza".to_string()),
            notes_zh: None,
            notes_ko: None,
            arrival_time_iso: arrival.map(str::to_string),
            departure_time_iso: None,
            cost_estimate: Some(15000.0),
            cost_estimate_usd: Some(100.0),
            details: Some("Total for 2 nights".to_string()),
            booking_url: None,
            recommended_date: None,
            time_zone: Some("JST".to_string()),
            image_url: None,
            rating: None,
            address: None,
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn parse_stop_time_accepts_model_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert_eq!(parse_stop_time("2025-03-01T15:00:00"), Some(expected));
        assert_eq!(parse_stop_time("2025-03-01T15:00"), Some(expected));
        assert_eq!(parse_stop_time("2025-03-01 15:00:00"), Some(expected));
        assert_eq!(parse_stop_time("2025-03-01T15:00:00Z"), Some(expected));
        assert_eq!(parse_stop_time("2025-03-01T15:00:00+09:00"), Some(expected));
        assert_eq!(parse_stop_time("soon"), None);
        assert_eq!(parse_stop_time(""), None);
    }

    #[test]
    fn from_generated_names_hotel_without_marker() {
        let stop = RouteStop::from_generated(generated(
            "Accommodation: Hotel Sunroute Plaza",
            Some("2025-03-01T15:00:00"),
        ));
        assert_eq!(stop.stop_name, "Hotel Sunroute Plaza");
        assert_eq!(stop.arrival_time.map(|t| t.hour()), Some(15));
        assert_eq!(stop.stop_name_en.as_deref(), Some("Hotel Sunroute Plaza"));
    }

    #[test]
    fn route_survives_document_round_trip() {
        let request = SaveRouteRequest {
            title: "京都 2泊3日".to_string(),
            is_public: true,
            stops: vec![
                generated("Accommodation: Hotel A", Some("2025-03-01T15:00:00")),
                generated("Accommodation: Hotel B", None),
            ],
            travel_style_fit: Some(TravelStyle::ComfortablePlan),
            total_budget: Some(80000.0),
            duration_days: Some(3),
        };
        let route = request.into_route("user-1".to_string(), None, None);

        let document = bson::to_document(&route).unwrap();
        assert!(!document.contains_key("_id"));
        let restored: Route = bson::from_document(document).unwrap();

        assert_eq!(restored.stops.len(), 2);
        assert_eq!(restored.stops, route.stops);
        assert_eq!(restored.title, route.title);
        assert_eq!(restored.travel_style_fit, Some(TravelStyle::ComfortablePlan));
    }

    #[test]
    fn to_generated_restores_iso_times() {
        let stop = RouteStop::from_generated(generated(
            "Accommodation: Hotel A",
            Some("2025-03-01T15:00"),
        ));
        let back = stop.to_generated();
        assert_eq!(back.arrival_time_iso.as_deref(), Some("2025-03-01T15:00:00"));
        assert_eq!(back.notes, "Accommodation: Hotel A");
    }
}
