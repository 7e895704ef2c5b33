use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherData {
    pub weather: String,
    pub temperature: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

/// Japanese label for a WMO weather interpretation code.
pub fn weather_description(code: i32) -> &'static str {
    match code {
        0 => "快晴 ☀️",
        1..=3 => "晴れ時々曇り 🌤",
        45..=48 => "霧 🌫",
        51..=55 => "霧雨 🌧",
        61..=65 => "雨 ☔️",
        71..=77 => "雪 ☃️",
        80..=82 => "にわか雨 🌦",
        c if c >= 95 => "雷雨 ⚡️",
        _ => "曇り ☁️",
    }
}

fn format_weather(place: &str, code: i32, max: f64, min: f64) -> WeatherData {
    WeatherData {
        weather: format!("{}の天気: {}", place, weather_description(code)),
        temperature: format!("最高: {}°C / 最低: {}°C", max, min),
    }
}

#[derive(Clone)]
pub struct WeatherService {
    client: Client,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherService {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Today's forecast for a city name. Any failure is logged and `None`.
    pub async fn get_weather(&self, city: &str) -> Option<WeatherData> {
        log::info!("Fetching weather for: {}", city);
        match self.fetch(city).await {
            Ok(weather) => weather,
            Err(e) => {
                log::error!("Error fetching weather for {}: {}", city, e);
                None
            }
        }
    }

    async fn fetch(&self, city: &str) -> Result<Option<WeatherData>, reqwest::Error> {
        let geo: GeocodingResponse = self
            .client
            .get(GEOCODING_URL)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "ja"),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(place) = geo.results.into_iter().next() else {
            log::warn!("No geocoding results for city: {}", city);
            return Ok(None);
        };
        log::debug!(
            "Coordinates: {}, {} ({})",
            place.latitude,
            place.longitude,
            place.name
        );

        let forecast: ForecastResponse = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(daily) = forecast.daily else {
            log::warn!("No daily weather data for {}", place.name);
            return Ok(None);
        };

        let today = (
            daily.weather_code.first(),
            daily.temperature_2m_max.first(),
            daily.temperature_2m_min.first(),
        );
        Ok(match today {
            (Some(&code), Some(&max), Some(&min)) => {
                Some(format_weather(&place.name, code, max, min))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_codes_map_to_labels() {
        assert_eq!(weather_description(0), "快晴 ☀️");
        assert_eq!(weather_description(45), "霧 🌫");
        assert_eq!(weather_description(61), "雨 ☔️");
        assert_eq!(weather_description(71), "雪 ☃️");
        assert_eq!(weather_description(95), "雷雨 ⚡️");
    }

    #[test]
    fn gaps_in_the_table_read_as_cloudy() {
        assert_eq!(weather_description(4), "曇り ☁️");
        assert_eq!(weather_description(66), "曇り ☁️");
        assert_eq!(weather_description(85), "曇り ☁️");
    }

    #[test]
    fn forecast_strings_keep_decimal_only_when_present() {
        let data = format_weather("京都", 61, 18.0, 11.5);
        assert_eq!(data.weather, "京都の天気: 雨 ☔️");
        assert_eq!(data.temperature, "最高: 18°C / 最低: 11.5°C");
    }

    #[test]
    fn forecast_payload_parses() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{"daily":{"time":["2025-04-01"],"weather_code":[3],"temperature_2m_max":[16.2],"temperature_2m_min":[8.1]}}"#,
        )
        .unwrap();
        let daily = forecast.daily.unwrap();
        assert_eq!(daily.weather_code, vec![3]);
        assert_eq!(daily.temperature_2m_max, vec![16.2]);
    }
}
