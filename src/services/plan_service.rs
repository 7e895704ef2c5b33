use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::plan::{
    GeneratedStop, PlanRequest, StopAlternative, TimelineEdit, TimelineResponse, TimelineSummary,
};
use crate::models::route::parse_stop_time;
use crate::services::booking_links;
use crate::services::gemini_service::GenerativeModel;
use crate::services::model_output;
use crate::services::places_service::PlaceLookup;
use crate::services::prompts;

const GENERATION_FAILED: &str = "Failed to generate plan";

/// Asks the model for an itinerary and decorates it with place data and
/// fallback booking links.
pub async fn generate_plan<M, P>(
    model: &M,
    places: &P,
    request: &PlanRequest,
) -> Result<Vec<GeneratedStop>, ApiError>
where
    M: GenerativeModel,
    P: PlaceLookup,
{
    generate_plan_on(model, places, request, Utc::now().date_naive()).await
}

pub async fn generate_plan_on<M, P>(
    model: &M,
    places: &P,
    request: &PlanRequest,
    today: NaiveDate,
) -> Result<Vec<GeneratedStop>, ApiError>
where
    M: GenerativeModel,
    P: PlaceLookup,
{
    if !model.is_configured() {
        log::error!("GEMINI_API_KEY is not set");
        return Err(ApiError::NotConfigured("Gemini API key"));
    }

    let user_input = prompts::effective_user_input(request)?;
    let prompt = prompts::build_plan_prompt(request, &user_input, today);

    let text = model.generate_text(&prompt).await.map_err(|e| {
        log::error!("Error generating plan: {}", e);
        ApiError::Generation(GENERATION_FAILED)
    })?;

    let stops: Vec<GeneratedStop> = model_output::parse_json(&text).map_err(|e| {
        log::error!("Error parsing generated plan: {}", e);
        log::debug!("Raw model output: {}", text);
        ApiError::Generation(GENERATION_FAILED)
    })?;

    log::info!("Model returned {} stops", stops.len());

    let stops = enrich_stops(places, stops).await;
    Ok(stops
        .into_iter()
        .map(|stop| finalize_stop(stop, request.group.adults, request.group.children))
        .collect())
}

/// Attaches photo, rating and address to place-like stops. Lookups run
/// concurrently; a miss leaves the stop as the model produced it.
pub async fn enrich_stops<P: PlaceLookup>(places: &P, stops: Vec<GeneratedStop>) -> Vec<GeneratedStop> {
    join_all(stops.into_iter().map(|mut stop| async move {
        if !stop.stop_type.is_place() {
            return stop;
        }
        let query = stop.place_query();
        if query.is_empty() {
            return stop;
        }
        if let Some(details) = places.lookup(&query).await {
            if details.photo_url.is_some() {
                stop.image_url = details.photo_url;
            }
            if details.rating.is_some() {
                stop.rating = details.rating;
            }
            if details.address.is_some() {
                stop.address = details.address;
            }
        }
        stop
    }))
    .await
}

fn finalize_stop(mut stop: GeneratedStop, adults: u32, children: u32) -> GeneratedStop {
    if stop.spot_id.trim().is_empty() {
        stop.spot_id = Uuid::new_v4().to_string();
    }
    if stop.booking_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
        stop.booking_url = Some(booking_links::link_for_stop(&stop, adults, children));
    }
    stop
}

fn renumber(stops: &mut [GeneratedStop]) {
    for (index, stop) in stops.iter_mut().enumerate() {
        stop.order = index as u32 + 1;
    }
}

/// Moves one stop to a new position and renumbers `order` from 1.
pub fn reorder_stops(stops: &mut Vec<GeneratedStop>, from: usize, to: usize) -> Result<(), ApiError> {
    if from >= stops.len() || to >= stops.len() {
        return Err(ApiError::BadRequest("Stop index out of range".to_string()));
    }
    let stop = stops.remove(from);
    stops.insert(to, stop);
    renumber(stops);
    Ok(())
}

/// Promotes an alternative to be the stop. The replaced stop goes to the end
/// of the alternatives list.
pub fn swap_alternative(stop: &mut GeneratedStop, index: usize) -> Result<(), ApiError> {
    if index >= stop.alternatives.len() {
        return Err(ApiError::BadRequest("Alternative index out of range".to_string()));
    }
    let chosen = stop.alternatives.remove(index);

    let current = StopAlternative {
        name: if stop.notes.is_empty() {
            "Unknown".to_string()
        } else {
            stop.notes.clone()
        },
        cost_estimate: stop.cost_estimate.unwrap_or(0.0),
        cost_estimate_usd: stop.cost_estimate_usd,
        details: stop.details.take(),
        booking_url: stop.booking_url.take(),
        stop_type: stop.stop_type,
    };
    stop.alternatives.retain(|alt| alt.name != chosen.name);
    stop.alternatives.push(current);

    stop.notes = chosen.name;
    stop.cost_estimate = Some(chosen.cost_estimate);
    stop.cost_estimate_usd = chosen.cost_estimate_usd;
    stop.details = chosen.details;
    stop.booking_url = chosen.booking_url;
    stop.stop_type = chosen.stop_type;
    // Place data described the old stop.
    stop.image_url = None;
    stop.rating = None;
    stop.address = None;
    Ok(())
}

fn duration_label(stops: &[GeneratedStop]) -> Option<String> {
    let mut timed: Vec<_> = stops
        .iter()
        .map(|stop| {
            (
                stop.arrival_time_iso.as_deref().and_then(parse_stop_time),
                stop.departure_time_iso.as_deref().and_then(parse_stop_time),
            )
        })
        .collect();
    timed.sort_by_key(|(arrival, _)| *arrival);

    let start = timed.first()?.0?;
    let end = timed.last()?.1?;
    let seconds = (end - start).num_seconds().unsigned_abs();
    let days = seconds.div_ceil(24 * 60 * 60);
    let nights = days.saturating_sub(1);
    Some(format!("{}泊{}日", nights, days))
}

pub fn summarize(stops: &[GeneratedStop]) -> TimelineSummary {
    TimelineSummary {
        total_cost: stops.iter().filter_map(|s| s.cost_estimate).sum(),
        total_cost_usd: stops.iter().filter_map(|s| s.cost_estimate_usd).sum(),
        recommended_date: stops.iter().find_map(|s| s.recommended_date.clone()),
        duration: duration_label(stops),
        has_translations: stops
            .iter()
            .any(|s| s.notes_en.is_some() || s.notes_zh.is_some() || s.notes_ko.is_some()),
    }
}

pub fn apply_timeline_edit(
    mut stops: Vec<GeneratedStop>,
    edit: &TimelineEdit,
) -> Result<TimelineResponse, ApiError> {
    match *edit {
        TimelineEdit::Move { from, to } => reorder_stops(&mut stops, from, to)?,
        TimelineEdit::SwapAlternative { stop, alternative } => {
            let target = stops
                .get_mut(stop)
                .ok_or_else(|| ApiError::BadRequest("Stop index out of range".to_string()))?;
            swap_alternative(target, alternative)?;
        }
    }
    let summary = summarize(&stops);
    Ok(TimelineResponse { stops, summary })
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::models::plan::StopType;

    const PLAN_REPLY: &str = r#"```json
[
  {"spot_id": "", "order": 1, "type": "train", "notes": "東京 → 京都 (Nozomi 1)", "arrival_time_iso": "2025-04-10T08:15:00", "departure_time_iso": "2025-04-10T06:00:00", "cost_estimate": 14170, "cost_estimate_usd": 94},
  {"spot_id": "s2", "order": 2, "type": "activity", "notes": "金閣寺", "arrival_time_iso": "2025-04-10T09:00:00", "departure_time_iso": "2025-04-10T10:30:00", "cost_estimate": 500, "booking_url": "https://www.shokoku-ji.jp/kinkakuji/"},
  {"spot_id": "s3", "order": 3, "type": "accommodation", "notes": "Accommodation: Hotel Kanra Kyoto", "arrival_time_iso": "2025-04-10T15:00:00", "departure_time_iso": "2025-04-11T10:00:00", "cost_estimate": 30000}
]
```"#;

    fn request() -> PlanRequest {
        serde_json::from_str(r#"{"user_input":"京都で1泊"}"#).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[actix_rt::test]
    async fn generated_plan_is_parsed_enriched_and_linked() {
        let model = CannedModel::replying(PLAN_REPLY);
        let stops = generate_plan_on(&model, &FixedPlace, &request(), today())
            .await
            .unwrap();

        assert_eq!(stops.len(), 3);
        assert!(!stops[0].spot_id.is_empty());
        assert_eq!(stops[0].image_url, None);
        assert!(stops[0]
            .booking_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.google.com/search?q="));

        assert_eq!(stops[1].rating, Some(4.5));
        assert_eq!(
            stops[1].booking_url.as_deref(),
            Some("https://www.shokoku-ji.jp/kinkakuji/")
        );

        assert_eq!(
            stops[2].image_url.as_deref(),
            Some("https://photos.test/id:Hotel Kanra Kyoto")
        );
        assert!(stops[2]
            .booking_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.booking.com/searchresults.html?ss=Hotel+Kanra+Kyoto"));

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("\"京都で1泊\""));
    }

    #[actix_rt::test]
    async fn place_misses_leave_stops_untouched() {
        let model = CannedModel::replying(PLAN_REPLY);
        let stops = generate_plan_on(&model, &NoPlaces, &request(), today())
            .await
            .unwrap();
        assert!(stops.iter().all(|s| s.image_url.is_none() && s.rating.is_none()));
    }

    #[actix_rt::test]
    async fn unparseable_reply_is_a_generation_error() {
        let model = CannedModel::replying("申し訳ありません。");
        let result = generate_plan_on(&model, &NoPlaces, &request(), today()).await;
        assert!(matches!(result, Err(ApiError::Generation(GENERATION_FAILED))));
    }

    #[actix_rt::test]
    async fn model_failure_is_a_generation_error() {
        let result = generate_plan_on(&CannedModel::failing(), &NoPlaces, &request(), today()).await;
        assert!(matches!(result, Err(ApiError::Generation(_))));
    }

    fn timeline() -> Vec<GeneratedStop> {
        let text = crate::services::model_output::strip_fences(PLAN_REPLY);
        let mut stops: Vec<GeneratedStop> = serde_json::from_str(&text).unwrap();
        stops[1].alternatives = vec![
            StopAlternative {
                name: "銀閣寺".to_string(),
                cost_estimate: 500.0,
                cost_estimate_usd: Some(3.5),
                details: Some("Ginkakuji".to_string()),
                booking_url: None,
                stop_type: StopType::Activity,
            },
            StopAlternative {
                name: "伏見稲荷".to_string(),
                cost_estimate: 0.0,
                cost_estimate_usd: Some(0.0),
                details: None,
                booking_url: None,
                stop_type: StopType::Activity,
            },
        ];
        stops
    }

    #[test]
    fn reorder_moves_and_renumbers() {
        let mut stops = timeline();
        reorder_stops(&mut stops, 2, 0).unwrap();
        assert_eq!(stops[0].notes, "Accommodation: Hotel Kanra Kyoto");
        assert_eq!(stops[1].notes, "東京 → 京都 (Nozomi 1)");
        assert_eq!(
            stops.iter().map(|s| s.order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(reorder_stops(&mut stops, 0, 3).is_err());
    }

    #[test]
    fn swapping_keeps_the_old_choice_as_alternative() {
        let mut stops = timeline();
        swap_alternative(&mut stops[1], 0).unwrap();
        let stop = &stops[1];
        assert_eq!(stop.notes, "銀閣寺");
        assert_eq!(stop.cost_estimate, Some(500.0));
        assert_eq!(
            stop.alternatives.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["伏見稲荷", "金閣寺"]
        );
        assert_eq!(
            stop.alternatives[1].booking_url.as_deref(),
            Some("https://www.shokoku-ji.jp/kinkakuji/")
        );
        assert!(swap_alternative(&mut stops[1], 5).is_err());
    }

    #[test]
    fn summary_totals_costs_and_duration() {
        let summary = summarize(&timeline());
        assert_eq!(summary.total_cost, 44670.0);
        assert_eq!(summary.total_cost_usd, 94.0);
        assert_eq!(summary.duration.as_deref(), Some("1泊2日"));
        assert!(!summary.has_translations);
    }

    #[test]
    fn duration_ends_at_the_last_arrival() {
        let mut stops = timeline();
        stops.truncate(2);
        stops[0].departure_time_iso = Some("2025-04-13T08:00:00".to_string());
        assert_eq!(summarize(&stops).duration.as_deref(), Some("0泊1日"));
    }

    #[test]
    fn timeline_edit_returns_fresh_summary() {
        let response = apply_timeline_edit(
            timeline(),
            &TimelineEdit::SwapAlternative {
                stop: 1,
                alternative: 1,
            },
        )
        .unwrap();
        assert_eq!(response.stops[1].notes, "伏見稲荷");
        assert_eq!(response.summary.total_cost, 44170.0);
    }
}
