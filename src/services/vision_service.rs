use base64::{engine::general_purpose, Engine as _};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::services::gemini_service::{GenerativeModel, InlineData, Part};
use crate::services::model_output;
use crate::services::prompts;

/// Guesses below this are treated as "no location".
pub const MIN_LOCATION_CONFIDENCE: f64 = 0.5;

const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationGuess {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripSpot {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Splits an optional `data:<mime>;base64,` header off an image payload and
/// checks the rest decodes.
pub fn decode_image(image: &str) -> Option<InlineData> {
    let (mime_type, data) = match image.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => {
            let mime = header
                .trim_start_matches("data:")
                .split(';')
                .next()
                .filter(|m| m.starts_with("image/"))
                .unwrap_or(DEFAULT_MIME);
            (mime.to_string(), data)
        }
        _ => (DEFAULT_MIME.to_string(), image),
    };

    let data = data.trim();
    if data.is_empty() || general_purpose::STANDARD.decode(data).is_err() {
        return None;
    }

    Some(InlineData {
        mime_type,
        data: data.to_string(),
    })
}

async fn ask_about_image<M: GenerativeModel>(
    model: &M,
    prompt: &str,
    image: &str,
) -> Option<String> {
    let Some(inline) = decode_image(image) else {
        log::warn!("Image payload is not valid base64");
        return None;
    };

    match model
        .generate(vec![
            Part::Text(prompt.to_string()),
            Part::InlineData(inline),
        ])
        .await
    {
        Ok(text) => Some(text),
        Err(e) => {
            log::error!("Error analyzing image: {}", e);
            None
        }
    }
}

/// Landmark identification for a single photo. Low-confidence guesses,
/// a `null` reply and any failure all come back as `None`.
pub async fn analyze_image_for_location<M: GenerativeModel>(
    model: &M,
    image: &str,
) -> Option<LocationGuess> {
    if !model.is_configured() {
        log::error!("GEMINI_API_KEY is not set");
        return None;
    }

    let text = ask_about_image(model, prompts::LOCATION_PROMPT, image).await?;
    if model_output::is_null_reply(&text) {
        return None;
    }

    let guess: LocationGuess = match model_output::parse_json(&text) {
        Ok(guess) => guess,
        Err(e) => {
            log::error!("Error parsing location guess: {}", e);
            return None;
        }
    };

    if guess.confidence < MIN_LOCATION_CONFIDENCE {
        log::debug!(
            "Dropping low-confidence guess {} ({})",
            guess.name,
            guess.confidence
        );
        return None;
    }
    Some(guess)
}

/// Describes each saved photo concurrently; failed images are skipped and
/// the rest keep input order.
pub async fn analyze_images_for_trip<M: GenerativeModel>(
    model: &M,
    images: &[String],
) -> Vec<TripSpot> {
    if !model.is_configured() {
        log::error!("GEMINI_API_KEY is not set");
        return Vec::new();
    }

    join_all(images.iter().map(|image| async move {
        let text = ask_about_image(model, prompts::TRIP_SPOT_PROMPT, image).await?;
        match model_output::parse_json::<TripSpot>(&text) {
            Ok(spot) => Some(spot),
            Err(e) => {
                log::error!("Error analyzing one of the images: {}", e);
                None
            }
        }
    }))
    .await
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plan_service::fakes::CannedModel;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn mime_comes_from_the_data_header() {
        let inline = decode_image(PNG).unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        assert_eq!(decode_image("/9j/4AAQ").unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(decode_image("data:image/png;base64,***").is_none());
        assert!(decode_image("").is_none());
    }

    #[actix_rt::test]
    async fn confident_guess_is_returned() {
        let model = CannedModel::replying(
            r#"{"name":"Tokyo Tower","lat":35.6586,"lng":139.7454,"confidence":0.92}"#,
        );
        let guess = analyze_image_for_location(&model, PNG).await.unwrap();
        assert_eq!(guess.name, "Tokyo Tower");
    }

    #[actix_rt::test]
    async fn weak_guess_and_null_are_dropped() {
        let weak = CannedModel::replying(
            r#"{"name":"Some Street","lat":35.0,"lng":139.0,"confidence":0.3}"#,
        );
        assert!(analyze_image_for_location(&weak, PNG).await.is_none());

        let null = CannedModel::replying("```json\nnull\n```");
        assert!(analyze_image_for_location(&null, PNG).await.is_none());
    }

    #[actix_rt::test]
    async fn trip_spots_skip_bad_images() {
        let model = CannedModel::replying(
            r#"{"name":"Unknown Cafe","description":"Cozy book cafe"}"#,
        );
        let images = vec![PNG.to_string(), "not base64!".to_string(), PNG.to_string()];
        let spots = analyze_images_for_trip(&model, &images).await;
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].description, "Cozy book cafe");
    }
}
