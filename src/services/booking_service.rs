//! Mock "instant booking" flow. Nothing is reserved; options are canned
//! and carry real search links.

use chrono::{Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::booking_links;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStep {
    Searching,
    Options,
    Booking,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingOption {
    pub title: String,
    pub price: u32,
    pub flight_time: String,
    pub hotel_rating: f32,
    pub recommended: bool,
    pub flight_url: String,
    pub hotel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingConfirmation {
    pub order_id: String,
    pub destination: String,
    pub schedule: String,
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub destination: String,
    pub origin: Option<String>,
    /// Option to book; omitted to only list options.
    pub option: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub step: BookingStep,
    pub options: Vec<BookingOption>,
    pub confirmation: Option<BookingConfirmation>,
}

const CANNED: [(&str, &str, u32, &str, f32); 3] = [
    ("JAL", "ホテルオークラ", 45_000, "10:00 AM", 4.8),
    ("ANA", "ヒルトン", 52_000, "11:30 AM", 4.5),
    ("Peach", "ゲストハウス", 18_000, "06:00 AM", 3.0),
];

#[derive(Debug, Clone)]
pub struct BookingFlow {
    destination: String,
    origin: String,
    step: BookingStep,
    options: Vec<BookingOption>,
    selected: Option<usize>,
}

impl BookingFlow {
    pub fn start(destination: &str, origin: Option<&str>) -> Result<Self, ApiError> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(ApiError::BadRequest("Destination is required".to_string()));
        }
        log::info!("{} の最安値を検索中...", destination);
        Ok(Self {
            destination: destination.to_string(),
            origin: origin.unwrap_or("Tokyo").trim().to_string(),
            step: BookingStep::Searching,
            options: Vec::new(),
            selected: None,
        })
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    fn invalid(&self, action: &str) -> ApiError {
        ApiError::BadRequest(format!("Cannot {} while {:?}", action, self.step))
    }

    /// Searching → Options.
    pub fn show_options(&mut self) -> Result<&[BookingOption], ApiError> {
        if self.step != BookingStep::Searching {
            return Err(self.invalid("list options"));
        }
        self.options = CANNED
            .iter()
            .enumerate()
            .map(|(index, &(airline, hotel, price, flight_time, rating))| BookingOption {
                title: format!("{} + {}", airline, hotel),
                price,
                flight_time: flight_time.to_string(),
                hotel_rating: rating,
                recommended: index == 0,
                flight_url: booking_links::flight_link(&self.origin, &self.destination, None),
                hotel_url: booking_links::hotel_link(
                    &format!("{} {}", hotel, self.destination),
                    None,
                    None,
                    2,
                    0,
                ),
            })
            .collect();
        self.step = BookingStep::Options;
        Ok(self.options.as_slice())
    }

    /// Options → Booking.
    pub fn book(&mut self, option: usize) -> Result<(), ApiError> {
        if self.step != BookingStep::Options {
            return Err(self.invalid("book"));
        }
        if option >= self.options.len() {
            return Err(ApiError::BadRequest("Unknown booking option".to_string()));
        }
        self.selected = Some(option);
        self.step = BookingStep::Booking;
        Ok(())
    }

    /// Booking → Confirmed.
    pub fn confirm(&mut self) -> Result<BookingConfirmation, ApiError> {
        let selected = match (self.step, self.selected) {
            (BookingStep::Booking, Some(selected)) => selected,
            _ => return Err(self.invalid("confirm")),
        };
        let option = self
            .options
            .get(selected)
            .ok_or_else(|| self.invalid("confirm"))?;

        let order_id = format!(
            "TRIP-{}-{:04}",
            Utc::now().year(),
            rand::thread_rng().gen_range(0..10_000)
        );
        let confirmation = BookingConfirmation {
            order_id,
            destination: self.destination.clone(),
            schedule: "次の週末".to_string(),
            total: option.price,
        };
        self.step = BookingStep::Confirmed;
        Ok(confirmation)
    }
}

/// Runs the flow as far as the request asks: options only, or through
/// confirmation when an option is chosen.
pub fn run(request: &BookingRequest) -> Result<BookingResponse, ApiError> {
    let mut flow = BookingFlow::start(&request.destination, request.origin.as_deref())?;
    let options = flow.show_options()?.to_vec();

    let confirmation = match request.option {
        Some(option) => {
            flow.book(option)?;
            Some(flow.confirm()?)
        }
        None => None,
    };

    Ok(BookingResponse {
        step: flow.step(),
        options,
        confirmation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_walks_all_steps_in_order() {
        let mut flow = BookingFlow::start("札幌", None).unwrap();
        assert_eq!(flow.step(), BookingStep::Searching);

        let options = flow.show_options().unwrap();
        assert_eq!(options.len(), 3);
        assert!(options[0].recommended);
        assert_eq!(options[0].title, "JAL + ホテルオークラ");
        assert_eq!(flow.step(), BookingStep::Options);

        flow.book(0).unwrap();
        assert_eq!(flow.step(), BookingStep::Booking);

        let confirmation = flow.confirm().unwrap();
        assert_eq!(flow.step(), BookingStep::Confirmed);
        assert_eq!(confirmation.total, 45_000);
        assert!(confirmation.order_id.starts_with("TRIP-"));
    }

    #[test]
    fn out_of_order_transitions_fail() {
        let mut flow = BookingFlow::start("札幌", None).unwrap();
        assert!(flow.book(0).is_err());
        assert!(flow.confirm().is_err());
        flow.show_options().unwrap();
        assert!(flow.show_options().is_err());
        assert!(flow.book(7).is_err());
        assert_eq!(flow.step(), BookingStep::Options);
    }

    #[test]
    fn empty_destination_is_rejected() {
        assert!(BookingFlow::start("  ", None).is_err());
    }

    #[test]
    fn run_without_choice_stops_at_options() {
        let response = run(&BookingRequest {
            destination: "Naha".to_string(),
            origin: Some("Osaka".to_string()),
            option: None,
        })
        .unwrap();
        assert_eq!(response.step, BookingStep::Options);
        assert!(response.confirmation.is_none());
        assert!(response.options[2].flight_url.contains("#flt=Osaka.Naha."));
    }
}
