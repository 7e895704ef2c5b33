use chrono::{NaiveDate, Utc};

use crate::error::ApiError;
use crate::models::plan::{ChatRequest, ChatResponse, ChatRole, ChatTurn};
use crate::services::gemini_service::GenerativeModel;
use crate::services::model_output;
use crate::services::prompts;

const CHAT_FAILED: &str = "Failed to process chat request";

fn history_section(history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let turns = history
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Model => "Assistant",
            };
            format!("    {}: {}", speaker, turn.parts)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n    Previous conversation:\n{}\n", turns)
}

/// Sends the whole itinerary plus the user's message. The caller replaces
/// its stop list with `updated_stops` when present.
pub async fn chat_with_plan<M: GenerativeModel>(
    model: &M,
    request: &ChatRequest,
) -> Result<ChatResponse, ApiError> {
    chat_with_plan_on(model, request, Utc::now().date_naive()).await
}

pub async fn chat_with_plan_on<M: GenerativeModel>(
    model: &M,
    request: &ChatRequest,
    today: NaiveDate,
) -> Result<ChatResponse, ApiError> {
    if !model.is_configured() {
        return Err(ApiError::NotConfigured("Gemini API key"));
    }
    if request.user_message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is empty".to_string()));
    }

    let mut prompt = prompts::build_chat_prompt(
        &request.current_stops,
        &request.user_message,
        &request.language,
        today,
    );
    prompt.push_str(&history_section(&request.history));

    let text = model.generate_text(&prompt).await.map_err(|e| {
        log::error!("Error in chat_with_plan: {}", e);
        ApiError::Generation(CHAT_FAILED)
    })?;

    model_output::parse_json(&text).map_err(|e| {
        log::error!("Error parsing chat reply: {}", e);
        ApiError::Generation(CHAT_FAILED)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plan_service::fakes::CannedModel;

    fn request(message: &str) -> ChatRequest {
        serde_json::from_value(serde_json::json!({
            "currentStops": [
                {"spot_id": "s1", "order": 1, "type": "accommodation", "notes": "Accommodation: Hotel A", "cost_estimate": 20000}
            ],
            "userMessage": message,
            "history": [
                {"role": "user", "parts": "予算は?"},
                {"role": "model", "parts": "約2万円です。"}
            ]
        }))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[actix_rt::test]
    async fn plan_change_returns_updated_stops() {
        let model = CannedModel::replying(
            r#"{"updatedStops":[{"spot_id":"s1","order":1,"type":"accommodation","notes":"Accommodation: Hotel B","cost_estimate":9000}],"reply":"ホテルを変更しました。"}"#,
        );
        let response = chat_with_plan_on(&model, &request("安いホテルに"), today())
            .await
            .unwrap();
        let stops = response.updated_stops.unwrap();
        assert_eq!(stops[0].notes, "Accommodation: Hotel B");
        assert_eq!(response.reply, "ホテルを変更しました。");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Accommodation: Hotel A"));
        assert!(prompts[0].contains("Assistant: 約2万円です。"));
    }

    #[actix_rt::test]
    async fn question_returns_reply_only() {
        let model = CannedModel::replying("```json\n{\"reply\":\"合計費用は約2万円です。\"}\n```");
        let response = chat_with_plan_on(&model, &request("合計は?"), today())
            .await
            .unwrap();
        assert!(response.updated_stops.is_none());
        assert_eq!(response.reply, "合計費用は約2万円です。");
    }

    #[actix_rt::test]
    async fn non_json_reply_is_an_error() {
        let model = CannedModel::replying("ホテルを変更しました。");
        let result = chat_with_plan_on(&model, &request("変えて"), today()).await;
        assert!(matches!(result, Err(ApiError::Generation(CHAT_FAILED))));
    }
}
