use std::collections::BTreeMap;

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Result of the travel-style diagnosis. Stored with the Japanese labels the
/// client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TravelStyle {
    #[serde(rename = "爆速コスパ")]
    FastAndCheap,
    #[serde(rename = "快適計画")]
    ComfortablePlan,
    #[serde(rename = "贅沢体験")]
    LuxuryExperience,
}

impl TravelStyle {
    pub fn label(&self) -> &'static str {
        match self {
            TravelStyle::FastAndCheap => "爆速コスパ",
            TravelStyle::ComfortablePlan => "快適計画",
            TravelStyle::LuxuryExperience => "贅沢体験",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TravelStyle::FastAndCheap => "効率とコストパフォーマンスを最重視する賢い旅人タイプ。",
            TravelStyle::ComfortablePlan => "バランスの取れた計画で失敗のない旅を楽しむタイプ。",
            TravelStyle::LuxuryExperience => {
                "時間と予算を惜しまず、最高の体験を求める優雅な旅人タイプ。"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Companion {
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub age: u32,
    pub gender: Gender,
    pub health_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stamina {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthProfile {
    pub avg_steps: u32,
    pub stamina: Stamina,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SnsPreferences {
    #[serde(default)]
    pub music: Vec<String>,
    #[serde(default)]
    pub food: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PushSettings {
    pub price_alert: bool,
    pub reminder: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub style_result: Option<TravelStyle>,
    #[serde(default)]
    pub followers_count: u32,

    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub residence: Option<String>,
    pub health_notes: Option<String>,
    #[serde(default)]
    pub companions: Vec<Companion>,
    #[serde(default)]
    pub tags: Vec<String>,

    pub health_profile: Option<HealthProfile>,
    pub sns_preferences: Option<SnsPreferences>,
    #[serde(default)]
    pub saved_posts: Vec<String>,

    #[serde(default)]
    pub push_settings: PushSettings,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    /// Record mirrored into the store the first time an identity signs in.
    pub fn new_from_identity(
        user_id: impl Into<String>,
        email: Option<String>,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            user_id: user_id.into(),
            email,
            display_name,
            photo_url,
            style_result: None,
            followers_count: 0,
            gender: None,
            age: None,
            residence: None,
            health_notes: None,
            companions: Vec::new(),
            tags: Vec::new(),
            health_profile: None,
            sns_preferences: None,
            saved_posts: Vec::new(),
            push_settings: PushSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile edit. Absent fields are left untouched.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub residence: Option<String>,
    pub health_notes: Option<String>,
    pub health_profile: Option<HealthProfile>,
    pub sns_preferences: Option<SnsPreferences>,
    pub push_settings: Option<PushSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_style_uses_japanese_labels() {
        let json = serde_json::to_string(&TravelStyle::LuxuryExperience).unwrap();
        assert_eq!(json, "\"贅沢体験\"");
        let parsed: TravelStyle = serde_json::from_str("\"爆速コスパ\"").unwrap();
        assert_eq!(parsed, TravelStyle::FastAndCheap);
    }

    #[test]
    fn push_settings_keep_extra_flags() {
        let parsed: PushSettings =
            serde_json::from_str(r#"{"price_alert":true,"reminder":false,"weekly_digest":true}"#)
                .unwrap();
        assert!(parsed.price_alert);
        assert_eq!(parsed.extra.get("weekly_digest"), Some(&true));
    }

    #[test]
    fn profile_update_omits_absent_fields() {
        let update = ProfileUpdate {
            residence: Some("大阪".to_string()),
            ..Default::default()
        };
        let doc = bson::to_document(&update).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get_str("residence").unwrap(), "大阪");
    }
}
