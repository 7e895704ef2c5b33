//! Prompt templates sent to the generative model.
//!
//! Each builder embeds the caller's inputs into a long natural-language
//! instruction and ends with the raw-JSON output contract that
//! `model_output::parse_json` relies on.

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::models::hotel::Hotel;
use crate::models::plan::{BudgetType, GeneratedStop, PlanMode, PlanRequest, UserProfileHints};

const RAW_JSON_SUFFIX: &str = "
    Do not include markdown formatting. Return only the raw JSON string.
    Ensure dates are valid ISO strings.
    Create a comprehensive plan including travel to/from destination.
";

const STOP_JSON_SHAPE: &str = r#"
    Return the response as a JSON array of objects.
    The JSON should strictly follow this structure:
    [
      {
        "spot_id": "unique_id_1",
        "order": 1,
        "type": "flight" | "train" | "bus" | "meal" | "activity" | "accommodation" | "other",
        "notes": "Accommodation: Hotel Name (in Japanese)",
        "details": "Airline/Train Name/Restaurant Type. Cost: Total for 3 nights.",
        "arrival_time_iso": "YYYY-MM-DDTHH:mm:ss",
        "departure_time_iso": "YYYY-MM-DDTHH:mm:ss",
        "time_zone": "JST",
        "cost_estimate": 1000, (JPY)
        "cost_estimate_usd": 7, (USD)
        "recommended_date": "YYYY-MM-DD", (Only for the first item if suggesting a date)
        "alternatives": [
          {
            "name": "Alternative Name",
            "cost_estimate": 1200,
            "cost_estimate_usd": 8,
            "details": "Details",
            "booking_url": "URL",
            "type": "meal"
          }
        ]
      }
    ]
"#;

const MULTILINGUAL_STOP_JSON_SHAPE: &str = r#"
    Return the response as a JSON array of objects.
    The JSON should strictly follow this structure:
    [
      {
        "spot_id": "unique_id_1",
        "order": 1,
        "type": "flight" | "train" | "bus" | "meal" | "activity" | "accommodation" | "other",
        "notes": "Accommodation: Hotel Name (in Japanese)",
        "notes_en": "Name (English)",
        "notes_zh": "Name (Simplified Chinese)",
        "notes_ko": "Name (Korean)",
        "details": "Airline/Train Name/Restaurant Type",
        "arrival_time_iso": "YYYY-MM-DDTHH:mm:ss",
        "departure_time_iso": "YYYY-MM-DDTHH:mm:ss",
        "time_zone": "JST",
        "cost_estimate": 1000, (JPY)
        "cost_estimate_usd": 7, (USD)
        "recommended_date": "YYYY-MM-DD", (Only for the first item if suggesting a date)
        "alternatives": [
          {
            "name": "Alternative Name",
            "cost_estimate": 1200,
            "cost_estimate_usd": 8,
            "details": "Details",
            "booking_url": "URL",
            "type": "meal"
          }
        ]
      }
    ]
"#;

const MODE_INSTRUCTIONS: &str = r#"
       **COMPASS TRIP INSTRUCTION (CRITICAL)**:
       - If the user request starts with "Compass Trip:", it means the user wants to go in a specific **Direction** for a specific **Time/Distance** from a **Start Point**.
       - **Step 1: Identify Destination**:
         - Analyze the request: "From [Start] go [Direction] for approx [Time/Distance]".
         - Using your geographical knowledge, identify a suitable travel destination that matches these criteria.
         - Example: "From Tokyo go West for 2 hours" -> Suggest "Hakone", "Atami", or "Kofu".
         - Example: "From Osaka go South for 3 hours" -> Suggest "Shirahama" or "Koyasan".
         - If a "Theme" is provided (e.g., "Onsen", "Nature"), prioritize destinations known for that theme.
       - **Step 2: Plan the Trip**:
         - Once the destination is decided, create a full itinerary for that destination as usual.
         - **Explicitly mention** the chosen destination in the first item's 'notes' or 'details' (e.g., "Destination chosen: Hakone (West of Tokyo, approx 1.5h)").

       **DART TRIP INSTRUCTION (CRITICAL)**:
       - If the user request starts with "Dart Trip:", it means the user wants a **Random Destination** within a specific **Range**.
       - **Step 1: Select Destination**:
         - Analyze the range: "Randomly select a destination in [Range]".
         - Randomly pick a popular or interesting travel destination within that range.
         - Example: "Range: Asia" -> Randomly pick "Bangkok", "Seoul", "Taipei", or "Bali".
         - Example: "Range: Nationwide" -> Randomly pick "Hokkaido", "Okinawa", "Kyoto", or "Kanazawa".
       - **Step 2: Plan the Trip**:
         - Identify the **Start Point** from "From [Start Location]".
         - Create a full itinerary for the chosen destination, **starting from the Start Point**.
         - **Explicitly mention** the chosen destination and that it was randomly selected in the first item's 'notes' (e.g., "Dart Trip Destination: Sapporo!").

       **PHOTO TRIP INSTRUCTION (CRITICAL)**:
       - If the user request starts with "Photo Trip:", it contains a list of "Must-Visit Spots" identified from photos.
       - **MANDATORY**: You MUST include ALL the listed spots in the itinerary.
       - Optimize the route to visit these spots efficiently.
       - If the spots are far apart, suggest a logical order or splitting them across days.

       **CONCIERGE INSTRUCTION (CRITICAL)**:
       - If the user request starts with "Concierge Trip:", it contains personal data (Health, SNS, Weather).
       - **Health**: If "Stamina" is low or steps are low, avoid steep hills/long walks. Suggest taxis/buses.
       - **SNS**: Prioritize spots matching "Music" (e.g., Jazz bar) and "Food" (e.g., Ramen shop) preferences.
       - **Weather**: If "Rainy", prioritize indoor activities (museums, shopping malls, covered arcades).
       - **Explicitly mention** how you personalized the plan in the `notes` (e.g., "Chosen indoor spot due to rain forecast", "Selected Jazz bar based on your music taste").

       **CROWD-SAFE INSTRUCTION (CRITICAL)**:
       - If the user request includes "[Avoid Crowds]", you MUST prioritize avoiding congestion.
       - **Strategy 1: Hidden Gems**: Prioritize "穴場" (anaba) spots that are less crowded but equally attractive.
       - **Strategy 2: Time Shifting**: Schedule popular spots for early morning (e.g., 8:00 AM) or late evening.
       - **Strategy 3: Alternatives**: Instead of the most famous (and crowded) spot, suggest a similar but quieter alternative (e.g., instead of Kiyomizu-dera, suggest a smaller temple nearby).
       - Mark these choices in `notes` as "**Crowd-Safe Choice**".

       **TAG INSTRUCTION**:
       - **HEAVILY prioritize** spots and activities that match the User Interest Tags.
       - If "Onsen" is selected, you **MUST** include a hot spring visit (day trip or overnight).
       - If "Museum" is selected, include a famous or unique museum.
       - If "Gourmet" or specific food tags (e.g., "Ramen") are selected, prioritize highly-rated spots for those foods.
       - Mark these items in `notes` as "**Matches Tag: [Tag Name]**".

       **TREND INSTRUCTION**:
       - Analyze the User Demographics (Age, Gender) and Travel Style.
       - Identify currently **TRENDING** spots, foods, or activities in the destination that specifically appeal to this demographic (e.g., "Instagrammable cafes" for young women, "Retro Izakaya" for middle-aged men, "Glamping" for families).
       - **MANDATORY**: Incorporate at least one "Trending" item into the plan.
       - Mark this item in the `notes` field as "**Trending for [Demographic]**" (e.g., "Trending for 20s Female").

       **RELATIONSHIP INSTRUCTION**:
       - Analyze the **Relationship** with companions (based on 'companions' info).
       - Adjust the **Vibe and Pace** of the plan accordingly:
         - **Partner**: Prioritize romantic spots, special dinners, night views, and a relaxed but special atmosphere.
         - **Mother/Daughter**: Prioritize relaxing spots, shopping, nice cafes/tea houses. Ensure not too much walking if age is a factor.
         - **Friends**: Prioritize fun, trendy spots, photo opportunities, and active experiences.
         - **Family with Kids**: Prioritize kid-friendly facilities, parks, and a flexible schedule with breaks.
         - **Solo**: Prioritize personal interests, solo-friendly dining, and deep dives into specific topics.
"#;

/// Renders a guided planning mode into the request text the mode
/// instructions above recognise.
pub fn render_mode(mode: &PlanMode, avoid_crowds: bool) -> Result<String, ApiError> {
    let mut text = match mode {
        PlanMode::Free {
            text,
            departure_city,
        } => {
            if text.trim().is_empty() {
                return Err(ApiError::BadRequest("Request text is empty".to_string()));
            }
            match departure_city.as_deref().filter(|c| !c.trim().is_empty()) {
                Some(city) => format!("{}\n出発地: {}", text, city),
                None => text.clone(),
            }
        }
        PlanMode::Compass {
            start_point,
            direction,
            time_value,
            time_unit,
            theme,
        } => {
            let direction = direction
                .ok_or_else(|| ApiError::BadRequest("方向を選択してください".to_string()))?;
            let mut text = format!(
                "Compass Trip: From {} go {} ({}方面) for approx {} {}.",
                start_point,
                direction.id(),
                direction.label(),
                time_value,
                time_unit
            );
            if let Some(theme) = theme.as_deref().filter(|t| !t.trim().is_empty()) {
                text.push_str(&format!(" Theme: {}.", theme));
            }
            text
        }
        PlanMode::Photo { spots, text } => {
            if spots.is_empty() {
                return Err(ApiError::BadRequest(
                    "写真からスポットを特定できませんでした。".to_string(),
                ));
            }
            format!(
                "Photo Trip: I want to visit these spots: {}. User Request: {}",
                spots.join(", "),
                text
            )
        }
        PlanMode::Concierge {
            health,
            music,
            food,
            weather,
            temperature,
            text,
        } => {
            let stamina = serde_json::to_value(health.stamina)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            format!(
                "Concierge Trip:\n            Health: {} steps / day, Stamina: {}.\n            SNS Likes: Music = [{}], Food = [{}].\n            Weather Forecast: {} {}.\n            User Request: {} ",
                health.steps,
                stamina,
                music.join(", "),
                food.join(", "),
                weather,
                temperature,
                text
            )
        }
        PlanMode::Dart {
            start_location,
            range,
            text,
        } => {
            let start = start_location
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("Tokyo");
            format!(
                "Dart Trip: From {}. Randomly select a destination in {}. User Request: {}",
                start, range, text
            )
        }
    };

    if avoid_crowds {
        text.push_str(" [Avoid Crowds]");
    }
    Ok(text)
}

/// The request text the plan prompt embeds: the rendered mode when one is
/// given, otherwise the free-text input.
pub fn effective_user_input(request: &PlanRequest) -> Result<String, ApiError> {
    match &request.mode {
        Some(mode) => render_mode(mode, request.avoid_crowds),
        None => {
            if request.user_input.trim().is_empty() {
                return Err(ApiError::BadRequest("Request text is empty".to_string()));
            }
            let mut text = request.user_input.clone();
            if request.avoid_crowds && !text.contains("[Avoid Crowds]") {
                text.push_str(" [Avoid Crowds]");
            }
            Ok(text)
        }
    }
}

fn profile_section(profile: Option<&UserProfileHints>) -> String {
    let style = match profile.and_then(|p| p.style.as_deref()) {
        Some(style) => format!(
            "User prefers '{}' style. Prioritize [Comfort/Price/Experience] accordingly.",
            style
        ),
        None => "No specific style preference.".to_string(),
    };
    let health = match profile.and_then(|p| p.health_notes.as_deref()) {
        Some(notes) => format!(
            "Consider health notes: '{}'. Adjust pace and accessibility (e.g., less walking, elevators).",
            notes
        ),
        None => "No specific health notes.".to_string(),
    };
    let companions = match profile.filter(|p| !p.companions.is_empty()) {
        Some(p) => format!(
            "Companions info: {}. Consider their needs (e.g., age, health).",
            serde_json::to_string(&p.companions).unwrap_or_default()
        ),
        None => "No registered companions info.".to_string(),
    };
    let age = profile
        .and_then(|p| p.age)
        .map(|age| format!("User Age: {}", age))
        .unwrap_or_default();
    let gender = profile
        .and_then(|p| p.gender.as_deref())
        .map(|gender| format!("Gender: {}", gender))
        .unwrap_or_default();
    let tags = match profile.filter(|p| !p.tags.is_empty()) {
        Some(p) => p.tags.join(", "),
        None => "No specific interest tags.".to_string(),
    };

    format!(
        r#"
    3. **User Profile & Preferences**:
       - **Travel Style**: {style}
       - **Health/Considerations**: {health}
       - **Companions**: {companions}
       - **User Info**: {age} {gender}.
       - **Interest Tags**: {tags}.
"#
    )
}

/// Full single-language planning prompt, or the shorter multilingual one
/// (with `notes_en/zh/ko`) when the request asks for it.
pub fn build_plan_prompt(request: &PlanRequest, user_input: &str, today: NaiveDate) -> String {
    let today = today.format("%Y-%m-%d").to_string();

    let mut prompt = if request.is_multilingual {
        format!(
            r#"
    You are an expert travel planner AI.
    Current Date: {today}.
    Create a highly detailed travel itinerary based on the user's request: "{user_input}".

    IMPORTANT:
    1. If dates are not specified, recommend the cheapest dates in the near future (from {today}).
    2. Provide cost estimates in both JPY and USD.
    3. STRICTLY ensure time continuity.
       - CRITICAL: First activity MUST start AFTER flight arrival.
       - Ensure (Prev Departure) + (Travel) <= (Curr Arrival).
    4. For Flights: MUST provide real flight number and airline.
       - If budget is insufficient, suggest cheapest option with warning.
    5. For Hotels: MUST provide specific hotel name and URL.
       - MUST specify if cost is 'Total' or 'Per Night' in 'details'.
       - Ensure 'notes' explicitly says 'Accommodation: [Hotel Name]'.
    6. For Meals/Hotels: Provide 2-3 alternatives.
    7. MUST include at least one restaurant/meal recommendation per day.
    8. MUST provide the time zone abbreviation (e.g., "JST", "PST") for each location.
    9. **REALISM CHECKS (CRITICAL)**:
       - **Transport Logic**: Do NOT suggest night buses or long-distance travel immediately after checking into a hotel.
       - **Flight Existence**: Verify that suggested flight routes actually exist.
       - **Geographical Consistency**: Ensure consecutive activities are geographically close.
       - **Hotel Logic**: Respect hotel check-in/out times.
       - **Hub & Spoke Transport**: If direct route unavailable, plan transit to major hub first. Do NOT invent direct routes.
{MULTILINGUAL_STOP_JSON_SHAPE}"#
        )
    } else {
        let group = request.group;
        let budget_amount = if request.budget.amount.trim().is_empty() {
            "Not specified".to_string()
        } else {
            format!("{} JPY", request.budget.amount.trim())
        };
        let budget_scope = match request.budget.budget_type {
            BudgetType::Total => "Total for whole group",
            BudgetType::PerPerson => "Per Person",
        };
        let profile = profile_section(request.user_profile.as_ref());
        let transport = request.transport_modes.join(", ");
        let language = &request.language;

        format!(
            r#"
    You are an expert travel planner AI.
    Current Date: {today}.
    Create a highly detailed travel itinerary based on the user's request: "{user_input}".

    IMPORTANT:
    1. Generate the plan in the user's language: "{language}".
       - If language is 'ja', use Japanese. If 'en', use English.
    2. Plan for a group of: {adults} Adults, {children} Children (Elementary), {infants} Infants.
       - Budget limit is: {budget_amount} ({budget_scope}).
       - Calculate costs considering age groups (e.g., child fares, infant free/reduced).
       - Suggest accommodation suitable for this group composition (e.g., family room, multiple rooms).
       - Output MUST include 'Total Cost' and 'Cost Per Person' in the summary or details of the final plan.
{profile}{MODE_INSTRUCTIONS}
    4. Consider the following transport options: {transport}.
       - If 'shinkansen' is selected and viable, prioritize it for domestic long-distance.
       - If 'bus' is selected and viable (e.g., night bus), consider it as a budget option.
    5. If dates are not specified, recommend the cheapest dates in the near future (e.g., next 3 months from {today}).
    6. Provide cost estimates in both JPY and USD (assume 1 USD = 150 JPY if unsure).
    7. STRICTLY ensure time continuity.
       - CRITICAL: The first activity at the destination MUST start AFTER the arrival time of the inbound flight/train/bus.
       - Ensure that (Departure Time of Previous Stop) + (Travel Time) <= (Arrival Time of Current Stop).
       - Double check all timestamps to ensure strictly increasing order.
    8. For Flights/Trains/Buses:
       - MUST provide real flight number (e.g., NH106), train name (e.g., Nozomi 1), or bus line (e.g., Willer Express).
       - **Cheapest Option**: Explicitly search for/estimate the lowest price for the chosen mode.
       - **Specific Locations**: MUST specify boarding and drop-off locations (e.g., "Tokyo Station (Yaesu South Exit)", "Busta Shinjuku").
       - If budget is insufficient, IGNORE budget for the transport and suggest the cheapest option with a warning note in 'details'.
    9. For Hotels: MUST provide specific hotel name (e.g., 'Hotel Sunroute Plaza') and URL.
       - MUST specify if cost is 'Total' or 'Per Night' in 'details' (e.g., 'Total for 3 nights', 'Per night').
       - Ensure 'notes' explicitly says 'Accommodation: [Hotel Name]' or similar to clarify it's time spent at the hotel.
    10. For Meals/Hotels: Provide 2-3 alternatives in an 'alternatives' array.
    11. MUST include at least one restaurant/meal recommendation per day.
    12. Include the round trip from the departure city.
    13. MUST provide the time zone abbreviation (e.g., "JST", "PST", "CET") for each location in 'time_zone' field.
    14. **REALISM CHECKS (CRITICAL)**:
        - **Transport Logic**: Do NOT suggest night buses or long-distance travel immediately after checking into a hotel or in the middle of a stay in one city.
        - **Flight Existence**: Verify that suggested flight routes actually exist between the specified cities. If no direct flight exists, suggest a connecting flight or alternative transport (train/bus).
        - **Geographical Consistency**: Ensure consecutive activities are geographically close or reachable within the allocated travel time.
        - **Hotel Logic**: Respect hotel check-in (usually 15:00) and check-out (usually 10:00-11:00) times. Do not schedule travel that conflicts with these unless checking out.
        - **Hub & Spoke Transport**: If a direct long-distance route (e.g., Night Bus, Flight) is NOT available from the starting point (e.g., a small local station), explicitly plan the transit to a major hub first.
          - Example: Instead of "Bus: Local Station -> Destination", output "Train: Local Station -> Major Hub (e.g., Osaka/Tokyo)", THEN "Bus: Major Hub -> Destination".
          - Do NOT invent direct routes that don't exist.
{STOP_JSON_SHAPE}"#,
            adults = group.adults,
            children = group.children,
            infants = group.infants,
        )
    };

    prompt.push_str(RAW_JSON_SUFFIX);
    prompt
}

pub fn build_chat_prompt(
    current_stops: &[GeneratedStop],
    user_message: &str,
    language: &str,
    today: NaiveDate,
) -> String {
    let today = today.format("%Y-%m-%d").to_string();
    let itinerary = serde_json::to_string_pretty(current_stops).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"
    You are an expert travel planner AI assistant.
    Current Date: {today}.

    You are helping a user refine their travel itinerary.

    Current Itinerary (JSON):
    {itinerary}

    User Request: "{user_message}"

    INSTRUCTIONS:
    1. Analyze the user's request.
    2. If the user wants to modify the plan (e.g., "change hotel", "add lunch", "remove dinner", "shorten trip"), you MUST return the UPDATED JSON of the itinerary.
       - The JSON must strictly follow the same structure as the input.
       - Ensure time continuity if you add/remove/change items.
       - Recalculate costs if necessary.
       - **CRITICAL: When adding or changing a spot (restaurant, hotel, activity, transport), you MUST provide:**
         - **Specific NAME**: Do NOT use vague terms like "a nice cafe" or "cheap hotel". Search for a REAL place (e.g., "Starbucks Shibuya", "Hotel Sunroute Plaza").
         - **Exact PRICE estimate**: Do NOT use "around 1000 yen". Provide a concrete estimate based on the real place.
         - **URL**: Provide the official website or booking URL if possible.
         - **Transport Details**: If changing transport, provide specific train/bus names and boarding locations.
    3. If the user just asks a question, return ONLY a text reply.
    4. If you update the plan, also provide a brief text explanation of what you changed in the "reply" field.

    CRITICAL RULES:
    - The "reply" field MUST be in the language specified by the user: "{language}".
    - If the language is 'ja' or unspecified, default to Japanese.
    - The "reply" field must ONLY contain your answer. DO NOT repeat or echo the user's request.
    - Do not output "User Request: ..." or similar prefixes.
    - **IF YOU SAY YOU CHANGED THE PLAN IN THE REPLY, YOU MUST RETURN "updatedStops".**
    - If "updatedStops" is missing, the user will NOT see any changes.

    OUTPUT FORMAT:
    Return a JSON object with two fields:
    - "updatedStops": (Optional) The updated array of stops if the plan was modified. Omit if no changes.
    - "reply": A text response to the user explaining the change or answering the question.

    Example Output (Plan Change):
    {{
      "updatedStops": [...],
      "reply": "ご希望通り、ホテルを安い場所に変更しました。"
    }}

    Example Output (No Plan Change):
    {{
      "reply": "合計費用は約15万円です。"
    }}

    IMPORTANT:
    - Return ONLY the raw JSON string. Do not use markdown code blocks.
    - Maintain the integrity of the JSON structure.
"#
    )
}

pub fn build_hotel_prompt(liked: &[Hotel]) -> String {
    let liked_names = liked
        .iter()
        .map(|hotel| format!("{} ({})", hotel.name, hotel.tags.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
    Based on the following hotels that the user "Liked", analyze their travel personality and recommend 3 similar hotels in Japan.

    Liked Hotels:
    {liked_names}

    Return a JSON object with the following fields. Ensure ALL content is in Japanese:
    - "personality": A short, catchy title for their travel style (e.g., "都会派ミニマリスト", "自然派ラグジュアリー").
    - "description": A 1-2 sentence explanation of their taste in Japanese.
    - "recommendations": An array of 3 hotels in Japan. Each hotel should have:
        - "name": Hotel Name (Japanese)
        - "location": City/Area (Japanese)
        - "reason": Why it matches their taste (Japanese)
        - "tags": Array of 3 keywords (Japanese)

    Do not include markdown formatting. Return only the raw JSON string.
"#
    )
}

pub const LOCATION_PROMPT: &str = r#"
    Analyze this image and identify the specific location or landmark shown.
    If you can identify it with high confidence, return a JSON object with:
    - "name": The specific name of the place (e.g., "Tokyo Tower", "Kinkakuji").
    - "lat": The latitude.
    - "lng": The longitude.
    - "confidence": A number between 0 and 1 indicating your confidence.

    If you cannot identify a specific location (e.g., it's a generic selfie or food photo without context), return null.
    Do not include markdown formatting. Return only the raw JSON string.
"#;

pub const TRIP_SPOT_PROMPT: &str = r#"
    Analyze this image for travel planning purposes.
    Identify the specific location/landmark if possible.
    If not a specific landmark, describe the "vibe" or type of place (e.g., "Cozy book cafe", "Sunset beach").

    Return a JSON object with:
    - "name": The specific name if known, otherwise a short title (e.g., "Unknown Cafe").
    - "description": A brief description of what is shown and why a traveler might save this photo.

    Do not include markdown formatting. Return only the raw JSON string.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::{Budget, ConciergeHealth, Direction, TravelerGroup};
    use crate::models::user::Stamina;

    fn request(input: &str) -> PlanRequest {
        PlanRequest {
            user_input: input.to_string(),
            mode: None,
            avoid_crowds: false,
            is_multilingual: false,
            language: "ja".to_string(),
            transport_modes: vec!["flight".to_string(), "shinkansen".to_string()],
            group: TravelerGroup {
                adults: 2,
                children: 1,
                infants: 0,
            },
            budget: Budget {
                amount: "100000".to_string(),
                budget_type: BudgetType::Total,
            },
            user_profile: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[test]
    fn plan_prompt_embeds_request_group_and_budget() {
        let req = request("札幌でラーメン巡り");
        let prompt = build_plan_prompt(&req, "札幌でラーメン巡り", today());
        assert!(prompt.contains("Current Date: 2025-04-01."));
        assert!(prompt.contains("\"札幌でラーメン巡り\""));
        assert!(prompt.contains("2 Adults, 1 Children (Elementary), 0 Infants"));
        assert!(prompt.contains("100000 JPY (Total for whole group)"));
        assert!(prompt.contains("flight, shinkansen"));
        assert!(prompt.contains("No specific style preference."));
        assert!(prompt.contains("COMPASS TRIP INSTRUCTION"));
        assert!(prompt.trim_end().ends_with("Create a comprehensive plan including travel to/from destination."));
    }

    #[test]
    fn multilingual_prompt_asks_for_translations() {
        let mut req = request("Kyoto");
        req.is_multilingual = true;
        let prompt = build_plan_prompt(&req, "Kyoto", today());
        assert!(prompt.contains("\"notes_zh\""));
        assert!(!prompt.contains("COMPASS TRIP INSTRUCTION"));
        assert!(prompt.contains("Return only the raw JSON string."));
    }

    #[test]
    fn profile_hints_are_rendered() {
        let mut req = request("Okinawa");
        req.user_profile = Some(UserProfileHints {
            style: Some("贅沢体験".to_string()),
            gender: Some("female".to_string()),
            age: Some(28),
            health_notes: Some("膝が悪い".to_string()),
            companions: Vec::new(),
            tags: vec!["Onsen".to_string(), "Museum".to_string()],
        });
        let prompt = build_plan_prompt(&req, "Okinawa", today());
        assert!(prompt.contains("User prefers '贅沢体験' style."));
        assert!(prompt.contains("Consider health notes: '膝が悪い'."));
        assert!(prompt.contains("User Age: 28 Gender: female."));
        assert!(prompt.contains("**Interest Tags**: Onsen, Museum."));
    }

    #[test]
    fn compass_mode_renders_direction_label() {
        let mode = PlanMode::Compass {
            start_point: "東京".to_string(),
            direction: Some(Direction::West),
            time_value: 2,
            time_unit: "hours".to_string(),
            theme: Some("Onsen".to_string()),
        };
        assert_eq!(
            render_mode(&mode, true).unwrap(),
            "Compass Trip: From 東京 go West (西方面) for approx 2 hours. Theme: Onsen. [Avoid Crowds]"
        );
    }

    #[test]
    fn compass_without_direction_is_rejected() {
        let mode = PlanMode::Compass {
            start_point: "東京".to_string(),
            direction: None,
            time_value: 2,
            time_unit: "hours".to_string(),
            theme: None,
        };
        assert!(matches!(render_mode(&mode, false), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn dart_defaults_start_to_tokyo() {
        let mode = PlanMode::Dart {
            start_location: None,
            range: "asia".to_string(),
            text: "週末".to_string(),
        };
        assert_eq!(
            render_mode(&mode, false).unwrap(),
            "Dart Trip: From Tokyo. Randomly select a destination in asia. User Request: 週末"
        );
    }

    #[test]
    fn photo_mode_needs_spots() {
        let empty = PlanMode::Photo {
            spots: Vec::new(),
            text: String::new(),
        };
        assert!(render_mode(&empty, false).is_err());

        let spots = PlanMode::Photo {
            spots: vec!["Tokyo Tower".to_string(), "Kinkakuji".to_string()],
            text: "3日間".to_string(),
        };
        assert_eq!(
            render_mode(&spots, false).unwrap(),
            "Photo Trip: I want to visit these spots: Tokyo Tower, Kinkakuji. User Request: 3日間"
        );
    }

    #[test]
    fn concierge_mode_folds_in_signals() {
        let mode = PlanMode::Concierge {
            health: ConciergeHealth {
                steps: 8500,
                stamina: Stamina::Low,
            },
            music: vec!["Jazz".to_string()],
            food: vec!["Ramen".to_string()],
            weather: "京都の天気: 雨 ☔️".to_string(),
            temperature: "最高: 18°C / 最低: 11°C".to_string(),
            text: "ゆっくり".to_string(),
        };
        let text = render_mode(&mode, false).unwrap();
        assert!(text.starts_with("Concierge Trip:"));
        assert!(text.contains("Health: 8500 steps / day, Stamina: low."));
        assert!(text.contains("Music = [Jazz], Food = [Ramen]"));
        assert!(text.contains("Weather Forecast: 京都の天気: 雨 ☔️ 最高: 18°C / 最低: 11°C."));
    }

    #[test]
    fn free_mode_appends_departure_city() {
        let mode = PlanMode::Free {
            text: "金沢で海鮮".to_string(),
            departure_city: Some("名古屋".to_string()),
        };
        assert_eq!(render_mode(&mode, false).unwrap(), "金沢で海鮮\n出発地: 名古屋");
    }

    #[test]
    fn empty_free_text_is_rejected() {
        assert!(effective_user_input(&request("   ")).is_err());
    }

    #[test]
    fn chat_prompt_carries_itinerary_and_language() {
        let prompt = build_chat_prompt(&[], "ホテルを変えて", "en", today());
        assert!(prompt.contains("User Request: \"ホテルを変えて\""));
        assert!(prompt.contains("specified by the user: \"en\""));
        assert!(prompt.contains("\"updatedStops\": [...]"));
    }

    #[test]
    fn hotel_prompt_lists_liked_hotels_with_tags() {
        let liked = vec![Hotel {
            id: "3".to_string(),
            name: "Trunk Hotel".to_string(),
            location: "Tokyo, Shibuya".to_string(),
            image: String::new(),
            tags: vec!["Hip".to_string(), "Design".to_string()],
            description: String::new(),
            price_range: "¥¥¥".to_string(),
        }];
        assert!(build_hotel_prompt(&liked).contains("Trunk Hotel (Hip, Design)"));
    }
}
