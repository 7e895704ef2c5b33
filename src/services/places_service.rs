use reqwest::Client;
use serde::Deserialize;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";
const DETAIL_FIELDS: &str = "name,rating,formatted_address,photos,opening_hours";

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub name: String,
    pub rating: Option<f64>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub is_open_now: Option<bool>,
}

/// Place search used to decorate itinerary stops. Lookups never fail loudly:
/// anything short of a hit is `None`.
pub trait PlaceLookup {
    async fn search_place(&self, query: &str) -> Option<String>;

    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails>;

    async fn lookup(&self, query: &str) -> Option<PlaceDetails> {
        let place_id = self.search_place(query).await?;
        self.place_details(&place_id).await
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    name: String,
    rating: Option<f64>,
    formatted_address: Option<String>,
    #[serde(default)]
    photos: Vec<Photo>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

#[derive(Clone)]
pub struct GooglePlacesService {
    client: Client,
    api_key: Option<String>,
}

impl GooglePlacesService {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::warn!("GOOGLE_MAPS_API_KEY missing; stops will not be enriched");
        }
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn photo_url(&self, api_key: &str, reference: &str) -> String {
        format!(
            "{}?maxwidth=800&photoreference={}&key={}",
            PHOTO_URL, reference, api_key
        )
    }
}

impl PlaceLookup for GooglePlacesService {
    async fn search_place(&self, query: &str) -> Option<String> {
        let api_key = self.api_key.as_deref()?;

        let response = self
            .client
            .get(TEXT_SEARCH_URL)
            .query(&[("query", query), ("key", api_key), ("language", "ja")])
            .send()
            .await;

        let body = match response {
            Ok(response) => response.json::<TextSearchResponse>().await,
            Err(e) => {
                log::error!("Place search failed for '{}': {}", query, e);
                return None;
            }
        };

        match body {
            Ok(body) if body.status == "OK" => body.results.into_iter().next().map(|r| r.place_id),
            Ok(body) => {
                log::debug!("Place search for '{}' returned {}", query, body.status);
                None
            }
            Err(e) => {
                log::error!("Place search response unreadable: {}", e);
                None
            }
        }
    }

    async fn place_details(&self, place_id: &str) -> Option<PlaceDetails> {
        let api_key = self.api_key.as_deref()?;

        let response = self
            .client
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", api_key),
                ("language", "ja"),
            ])
            .send()
            .await;

        let body = match response {
            Ok(response) => response.json::<DetailsResponse>().await,
            Err(e) => {
                log::error!("Place details failed for {}: {}", place_id, e);
                return None;
            }
        };

        let result = match body {
            Ok(body) if body.status == "OK" => body.result?,
            Ok(_) => return None,
            Err(e) => {
                log::error!("Place details response unreadable: {}", e);
                return None;
            }
        };

        let photo_url = result
            .photos
            .first()
            .map(|photo| self.photo_url(api_key, &photo.photo_reference));

        Some(PlaceDetails {
            name: result.name,
            rating: result.rating,
            address: result.formatted_address,
            photo_url,
            is_open_now: result.opening_hours.and_then(|h| h.open_now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_without_key_short_circuit() {
        let places = GooglePlacesService::new(None);
        assert_eq!(tokio_test::block_on(places.lookup("Kinkakuji")), None);
    }

    #[test]
    fn photo_url_uses_first_reference_at_800px() {
        let places = GooglePlacesService::new(Some("key".to_string()));
        assert_eq!(
            places.photo_url("key", "ref123"),
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=800&photoreference=ref123&key=key"
        );
    }

    #[test]
    fn details_payload_parses() {
        let body: DetailsResponse = serde_json::from_str(
            r#"{"status":"OK","result":{"name":"金閣寺","rating":4.6,"formatted_address":"京都市北区","photos":[{"photo_reference":"abc"}],"opening_hours":{"open_now":true}}}"#,
        )
        .unwrap();
        let result = body.result.unwrap();
        assert_eq!(result.name, "金閣寺");
        assert_eq!(result.photos[0].photo_reference, "abc");
        assert_eq!(result.opening_hours.and_then(|h| h.open_now), Some(true));
    }
}
