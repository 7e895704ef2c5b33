use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::models::user::{Companion, Stamina};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopType {
    Flight,
    Train,
    Bus,
    Meal,
    Activity,
    Accommodation,
    #[default]
    #[serde(other)]
    Other,
}

impl StopType {
    /// Stops worth a place lookup for photo, rating and address.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            StopType::Activity | StopType::Meal | StopType::Accommodation
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, StopType::Flight | StopType::Train | StopType::Bus)
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StopAlternative {
    pub name: String,
    #[serde(default)]
    pub cost_estimate: f64,
    pub cost_estimate_usd: Option<f64>,
    pub details: Option<String>,
    pub booking_url: Option<String>,
    #[serde(rename = "type", default)]
    pub stop_type: StopType,
}

/// One itinerary entry as exchanged with the model and the client.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneratedStop {
    #[serde(default)]
    pub spot_id: String,
    #[serde(default)]
    pub order: u32,
    #[serde(rename = "type", default)]
    pub stop_type: StopType,
    #[serde(default)]
    pub notes: String,
    pub notes_en: Option<String>,
    pub notes_zh: Option<String>,
    pub notes_ko: Option<String>,
    pub arrival_time_iso: Option<String>,
    pub departure_time_iso: Option<String>,
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

pub const ACCOMMODATION_PREFIX: &str = "Accommodation:";

impl GeneratedStop {
    /// Name used for place search and display: the notes without the
    /// `Accommodation:` marker the prompt asks for on hotel stops.
    pub fn place_query(&self) -> String {
        match self.notes.find(ACCOMMODATION_PREFIX) {
            Some(_) => self.notes.replacen(ACCOMMODATION_PREFIX, "", 1).trim().to_string(),
            None => self.notes.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TravelerGroup {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for TravelerGroup {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Total,
    #[default]
    PerPerson,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Budget {
    #[serde(default)]
    pub amount: String,
    #[serde(rename = "type", default)]
    pub budget_type: BudgetType,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserProfileHints {
    pub style: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub health_notes: Option<String>,
    #[serde(default)]
    pub companions: Vec<Companion>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn id(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::NorthEast => "NorthEast",
            Direction::East => "East",
            Direction::SouthEast => "SouthEast",
            Direction::South => "South",
            Direction::SouthWest => "SouthWest",
            Direction::West => "West",
            Direction::NorthWest => "NorthWest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "北",
            Direction::NorthEast => "北東",
            Direction::East => "東",
            Direction::SouthEast => "南東",
            Direction::South => "南",
            Direction::SouthWest => "南西",
            Direction::West => "西",
            Direction::NorthWest => "北西",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConciergeHealth {
    pub steps: u32,
    pub stamina: Stamina,
}

/// Guided planning input, rendered server-side into the free-text request the
/// prompt's mode instructions recognise.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlanMode {
    Free {
        text: String,
        departure_city: Option<String>,
    },
    Compass {
        start_point: String,
        direction: Option<Direction>,
        time_value: u32,
        time_unit: String,
        theme: Option<String>,
    },
    Photo {
        spots: Vec<String>,
        #[serde(default)]
        text: String,
    },
    Concierge {
        health: ConciergeHealth,
        #[serde(default)]
        music: Vec<String>,
        #[serde(default)]
        food: Vec<String>,
        #[serde(default)]
        weather: String,
        #[serde(default)]
        temperature: String,
        #[serde(default)]
        text: String,
    },
    Dart {
        start_location: Option<String>,
        range: String,
        #[serde(default)]
        text: String,
    },
}

fn default_language() -> String {
    "ja".to_string()
}

fn default_transport_modes() -> Vec<String> {
    vec!["flight".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanRequest {
    /// Free-text request. Ignored when `mode` is present.
    #[serde(default)]
    pub user_input: String,
    pub mode: Option<PlanMode>,
    #[serde(default)]
    pub avoid_crowds: bool,
    #[serde(default)]
    pub is_multilingual: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_transport_modes")]
    pub transport_modes: Vec<String>,
    #[serde(default)]
    pub group: TravelerGroup,
    #[serde(default)]
    pub budget: Budget,
    pub user_profile: Option<UserProfileHints>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub current_stops: Vec<GeneratedStop>,
    pub user_message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub updated_stops: Option<Vec<GeneratedStop>>,
    #[serde(default)]
    pub reply: String,
}

/// Local timeline edits the client applies before an explicit save.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum TimelineEdit {
    Move { from: usize, to: usize },
    SwapAlternative { stop: usize, alternative: usize },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimelineRequest {
    pub stops: Vec<GeneratedStop>,
    pub edit: TimelineEdit,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
    pub total_cost: f64,
    pub total_cost_usd: f64,
    pub recommended_date: Option<String>,
    /// "{nights}泊{days}日" from the earliest arrival to the departure of the
    /// stop that arrives last.
    pub duration: Option<String>,
    pub has_translations: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse {
    pub stops: Vec<GeneratedStop>,
    pub summary: TimelineSummary,
}
