use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One piece of a prompt: text or an inline base64 image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug)]
pub enum GeminiError {
    NotConfigured,
    HttpError(reqwest::Error),
    ResponseError(String),
    EmptyResponse,
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiError::NotConfigured => write!(f, "GEMINI_API_KEY is not set"),
            GeminiError::HttpError(err) => write!(f, "HTTP error: {}", err),
            GeminiError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            GeminiError::EmptyResponse => write!(f, "Model returned no text"),
        }
    }
}

impl Error for GeminiError {}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::HttpError(err)
    }
}

/// Prompt-in, text-out generative model.
pub trait GenerativeModel {
    fn is_configured(&self) -> bool;

    async fn generate(&self, parts: Vec<Part>) -> Result<String, GeminiError>;

    async fn generate_text(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate(vec![Part::Text(prompt.to_string())]).await
    }
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiService {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model)
    }
}

impl GenerativeModel for GeminiService {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, GeminiError> {
        let api_key = self.api_key.as_ref().ok_or(GeminiError::NotConfigured)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeminiError::ResponseError(format!(
                "generateContent failed with status {}: {}",
                status, error_text
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ResponseError(format!("Failed to parse response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_serialize_in_rest_shape() {
        let parts = vec![
            Part::Text("identify".to_string()),
            Part::InlineData(InlineData {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            }),
        ];
        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(json[0]["text"], "identify");
        assert_eq!(json[1]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn unconfigured_service_reports_it() {
        let service = GeminiService::new(None, "gemini-2.0-flash");
        assert!(!service.is_configured());
        let result = tokio_test::block_on(service.generate_text("hello"));
        assert!(matches!(result, Err(GeminiError::NotConfigured)));
    }
}
