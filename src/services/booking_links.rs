//! Search deep links shown next to stops when the model gave no booking URL.

use chrono::Utc;
use url::form_urlencoded::{byte_serialize, Serializer};

use crate::models::plan::{GeneratedStop, StopType};

// encodeURIComponent-style: spaces as %20, not '+'.
fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn hotel_link(
    name: &str,
    check_in: Option<&str>,
    check_out: Option<&str>,
    adults: u32,
    children: u32,
) -> String {
    let mut params = Serializer::new(String::new());
    params.append_pair("ss", name);
    if let Some(check_in) = check_in {
        params.append_pair("checkin", check_in);
    }
    if let Some(check_out) = check_out {
        params.append_pair("checkout", check_out);
    }
    params.append_pair("group_adults", &adults.to_string());
    params.append_pair("group_children", &children.to_string());

    format!(
        "https://www.booking.com/searchresults.html?{}",
        params.finish()
    )
}

pub fn transport_link(from: &str, to: &str) -> String {
    let params = Serializer::new(String::new())
        .append_pair("origin", from)
        .append_pair("destination", to)
        .append_pair("travelmode", "transit")
        .finish();
    format!("https://www.google.com/maps/dir/?api=1&{}", params)
}

pub fn restaurant_link(name: &str) -> String {
    let params = Serializer::new(String::new())
        .append_pair("query", name)
        .finish();
    format!("https://www.google.com/maps/search/?api=1&{}", params)
}

pub fn activity_link(name: &str) -> String {
    let params = Serializer::new(String::new())
        .append_pair("q", &format!("{} 予約", name))
        .finish();
    format!("https://www.google.com/search?{}", params)
}

/// Google Flights `flt=Origin.Dest.Date` fragment; date defaults to today.
pub fn flight_link(from: &str, to: &str, date: Option<&str>) -> String {
    let date = date
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
    format!(
        "https://www.google.com/flights?hl=ja#flt={}.{}.{};c:JPY;e:1;sd:1;t:f",
        encode_component(from),
        encode_component(to),
        date
    )
}

pub fn bus_link(from: &str, to: &str, date: Option<&str>) -> String {
    let query = format!("高速バス {} {} 予約 {}", from, to, date.unwrap_or(""));
    format!("https://www.google.com/search?q={}", encode_component(&query))
}

pub fn train_link(from: &str, to: &str, date: Option<&str>) -> String {
    let query = format!("新幹線 {} {} 予約 {}", from, to, date.unwrap_or(""));
    format!("https://www.google.com/search?q={}", encode_component(&query))
}

/// Splits "A → B" / "A -> B" / "A - B" transport notes into endpoints.
pub fn route_endpoints(notes: &str) -> Option<(String, String)> {
    ["→", "->", "⇒", " - ", "〜", "~"].iter().find_map(|sep| {
        let (from, to) = notes.split_once(sep)?;
        let from = from.trim();
        let to = to.trim();
        (!from.is_empty() && !to.is_empty()).then(|| (from.to_string(), to.to_string()))
    })
}

fn date_part(iso: Option<&str>) -> Option<&str> {
    iso.and_then(|iso| iso.get(..10))
}

/// Best search link for a stop, by stop type.
pub fn link_for_stop(stop: &GeneratedStop, adults: u32, children: u32) -> String {
    let name = stop.place_query();
    let date = date_part(stop.departure_time_iso.as_deref())
        .or_else(|| date_part(stop.arrival_time_iso.as_deref()));

    match stop.stop_type {
        StopType::Accommodation => hotel_link(
            &name,
            date_part(stop.arrival_time_iso.as_deref()),
            date_part(stop.departure_time_iso.as_deref()),
            adults,
            children,
        ),
        StopType::Meal => restaurant_link(&name),
        StopType::Activity | StopType::Other => activity_link(&name),
        StopType::Flight | StopType::Train | StopType::Bus => match route_endpoints(&name) {
            Some((from, to)) => match stop.stop_type {
                StopType::Flight => flight_link(&from, &to, date),
                StopType::Bus => bus_link(&from, &to, date),
                _ => train_link(&from, &to, date),
            },
            None => activity_link(&name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(stop_type: StopType, notes: &str) -> GeneratedStop {
        serde_json::from_value(serde_json::json!({
            "spot_id": "x",
            "order": 1,
            "type": stop_type,
            "notes": notes,
            "arrival_time_iso": "2025-05-01T15:00:00",
            "departure_time_iso": "2025-05-03T10:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn hotel_link_carries_dates_and_group() {
        assert_eq!(
            hotel_link("Hotel Gracery", Some("2025-05-01"), Some("2025-05-03"), 2, 1),
            "https://www.booking.com/searchresults.html?ss=Hotel+Gracery&checkin=2025-05-01&checkout=2025-05-03&group_adults=2&group_children=1"
        );
    }

    #[test]
    fn transport_link_uses_transit_mode() {
        assert_eq!(
            transport_link("Tokyo", "Kyoto"),
            "https://www.google.com/maps/dir/?api=1&origin=Tokyo&destination=Kyoto&travelmode=transit"
        );
    }

    #[test]
    fn flight_link_encodes_endpoints() {
        assert_eq!(
            flight_link("New York", "Tokyo", Some("2025-06-01")),
            "https://www.google.com/flights?hl=ja#flt=New%20York.Tokyo.2025-06-01;c:JPY;e:1;sd:1;t:f"
        );
    }

    #[test]
    fn train_link_searches_for_reservation() {
        assert_eq!(
            train_link("A", "B", None),
            "https://www.google.com/search?q=%E6%96%B0%E5%B9%B9%E7%B7%9A%20A%20B%20%E4%BA%88%E7%B4%84%20"
        );
    }

    #[test]
    fn endpoints_split_on_arrow() {
        assert_eq!(
            route_endpoints("羽田 → 新千歳 (NH53)"),
            Some(("羽田".to_string(), "新千歳 (NH53)".to_string()))
        );
        assert_eq!(route_endpoints("すみれ"), None);
    }

    #[test]
    fn stop_links_follow_type() {
        let hotel = link_for_stop(&stop(StopType::Accommodation, "Accommodation: Zaborin"), 2, 0);
        assert!(hotel.contains("ss=Zaborin&checkin=2025-05-01&checkout=2025-05-03"));

        let meal = link_for_stop(&stop(StopType::Meal, "すみれ"), 1, 0);
        assert!(meal.starts_with("https://www.google.com/maps/search/?api=1&query="));

        let flight = link_for_stop(&stop(StopType::Flight, "HND -> CTS"), 1, 0);
        assert!(flight.contains("#flt=HND.CTS.2025-05-03"));
    }
}
