use crate::models::hotel::{Hotel, HotelAnalysis, HotelSwipeRequest};
use crate::services::gemini_service::GenerativeModel;
use crate::services::model_output;
use crate::services::prompts;

struct DeckEntry {
    id: &'static str,
    name: &'static str,
    location: &'static str,
    image: &'static str,
    tags: [&'static str; 4],
    description: &'static str,
    price_range: &'static str,
}

const DECK: [DeckEntry; 10] = [
    DeckEntry {
        id: "1",
        name: "HOSHINOYA Tokyo",
        location: "Tokyo, Otemachi",
        image: "https://images.unsplash.com/photo-1542314831-068cd1dbfeeb?q=80&w=1000&auto=format&fit=crop",
        tags: ["Luxury", "Ryokan", "Onsen", "City"],
        description: "A modern ryokan in the heart of Tokyo, offering a serene escape with traditional hospitality.",
        price_range: "¥¥¥¥",
    },
    DeckEntry {
        id: "2",
        name: "Aman Kyoto",
        location: "Kyoto, Kita-ku",
        image: "https://images.unsplash.com/photo-1600093463592-8e36ae95ef56?q=80&w=1000&auto=format&fit=crop",
        tags: ["Nature", "Luxury", "Secluded", "Forest"],
        description: "Set in a secret garden, this resort honors the heritage of Japan in a peaceful natural setting.",
        price_range: "¥¥¥¥¥",
    },
    DeckEntry {
        id: "3",
        name: "Trunk Hotel",
        location: "Tokyo, Shibuya",
        image: "https://images.unsplash.com/photo-1590490360182-c33d57733427?q=80&w=1000&auto=format&fit=crop",
        tags: ["Hip", "Design", "Social", "Nightlife"],
        description: "A boutique hotel in Shibuya that embodies the \"socializing\" concept with stylish design.",
        price_range: "¥¥¥",
    },
    DeckEntry {
        id: "4",
        name: "Zaborin",
        location: "Hokkaido, Niseko",
        image: "https://images.unsplash.com/photo-1582719508461-905c673771fd?q=80&w=1000&auto=format&fit=crop",
        tags: ["Snow", "Onsen", "Kaiseki", "Private"],
        description: "A contemporary ryokan nestled in the woods of Niseko, featuring private indoor and outdoor baths.",
        price_range: "¥¥¥¥",
    },
    DeckEntry {
        id: "5",
        name: "Benesse House",
        location: "Kagawa, Naoshima",
        image: "https://images.unsplash.com/photo-1520250497591-112f2f40a3f4?q=80&w=1000&auto=format&fit=crop",
        tags: ["Art", "Museum", "Sea", "Architecture"],
        description: "A facility integrating a museum and a hotel, based on the concept of \"coexistence of nature, art and architecture\".",
        price_range: "¥¥¥¥",
    },
    DeckEntry {
        id: "6",
        name: "Halekulani Okinawa",
        location: "Okinawa, Onna",
        image: "https://images.unsplash.com/photo-1571896349842-6e5a513e610a?q=80&w=1000&auto=format&fit=crop",
        tags: ["Beach", "Resort", "Pool", "Family"],
        description: "A luxury beach resort located on the main island of Okinawa, offering a sanctuary of elegance.",
        price_range: "¥¥¥¥",
    },
    DeckEntry {
        id: "7",
        name: "Fuji Speedway Hotel",
        location: "Shizuoka, Oyama",
        image: "https://images.unsplash.com/photo-1566073771259-6a8506099945?q=80&w=1000&auto=format&fit=crop",
        tags: ["Motorsports", "Mt. Fuji", "Modern", "Activity"],
        description: "A unique hotel adjacent to the Fuji Speedway, offering breathtaking views of Mt. Fuji and the circuit.",
        price_range: "¥¥¥",
    },
    DeckEntry {
        id: "8",
        name: "K5",
        location: "Tokyo, Nihonbashi",
        image: "https://images.unsplash.com/photo-1505691938895-1758d7feb511?q=80&w=1000&auto=format&fit=crop",
        tags: ["Historical", "Design", "Bar", "City"],
        description: "A micro-complex housed in a converted 1920s bank building, blending history with modern design.",
        price_range: "¥¥¥",
    },
    DeckEntry {
        id: "9",
        name: "Sankara Hotel & Spa",
        location: "Kagoshima, Yakushima",
        image: "https://images.unsplash.com/photo-1445019980597-93fa8acb246c?q=80&w=1000&auto=format&fit=crop",
        tags: ["Island", "Nature", "Spa", "Retreat"],
        description: "A resort hotel on the mystical island of Yakushima, offering a luxurious stay amidst ancient forests.",
        price_range: "¥¥¥¥",
    },
    DeckEntry {
        id: "10",
        name: "W Osaka",
        location: "Osaka, Shinsaibashi",
        image: "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa?q=80&w=1000&auto=format&fit=crop",
        tags: ["Urban", "Party", "Luxury", "Neon"],
        description: "The first W Hotel in Japan, featuring a bold design and vibrant energy in the heart of Osaka.",
        price_range: "¥¥¥¥",
    },
];

impl DeckEntry {
    fn to_hotel(&self) -> Hotel {
        Hotel {
            id: self.id.to_string(),
            name: self.name.to_string(),
            location: self.location.to_string(),
            image: self.image.to_string(),
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            description: self.description.to_string(),
            price_range: self.price_range.to_string(),
        }
    }
}

/// Cards for the swipe quiz, in presentation order.
pub fn hotel_deck() -> Vec<Hotel> {
    DECK.iter().map(DeckEntry::to_hotel).collect()
}

/// Full cards for a swipe result: posted cards first, then deck ids that
/// were not already posted.
pub fn resolve_liked(request: HotelSwipeRequest) -> Vec<Hotel> {
    let mut liked = request.liked_hotels;
    for id in &request.liked_ids {
        if liked.iter().any(|hotel| &hotel.id == id) {
            continue;
        }
        if let Some(entry) = DECK.iter().find(|entry| entry.id == id) {
            liked.push(entry.to_hotel());
        }
    }
    liked
}

/// Travel personality from liked hotels. `None` on any failure.
pub async fn analyze_hotel_preferences<M: GenerativeModel>(
    model: &M,
    liked: &[Hotel],
) -> Option<HotelAnalysis> {
    if !model.is_configured() {
        log::error!("GEMINI_API_KEY is not set");
        return None;
    }

    let prompt = prompts::build_hotel_prompt(liked);
    let text = match model.generate_text(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error analyzing preferences: {}", e);
            return None;
        }
    };

    match model_output::parse_json(&text) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            log::error!("Error parsing preference analysis: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plan_service::fakes::CannedModel;

    #[test]
    fn deck_has_ten_cards_with_unique_ids() {
        let deck = hotel_deck();
        assert_eq!(deck.len(), 10);
        let mut ids: Vec<_> = deck.iter().map(|h| h.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(deck[9].name, "W Osaka");
    }

    #[test]
    fn liked_ids_resolve_against_the_deck() {
        let liked = resolve_liked(HotelSwipeRequest {
            liked_hotels: vec![hotel_deck()[0].clone()],
            liked_ids: vec!["1".to_string(), "4".to_string(), "99".to_string()],
        });
        assert_eq!(
            liked.iter().map(|h| h.name.as_str()).collect::<Vec<_>>(),
            vec!["HOSHINOYA Tokyo", "Zaborin"]
        );
    }

    #[actix_rt::test]
    async fn analysis_parses_fenced_reply() {
        let model = CannedModel::replying(
            "```json\n{\"personality\":\"自然派ラグジュアリー\",\"description\":\"静けさを好む。\",\"recommendations\":[{\"name\":\"星のや京都\",\"location\":\"京都・嵐山\",\"reason\":\"川沿いの静寂\",\"tags\":[\"自然\",\"旅館\",\"静寂\"]}]}\n```",
        );
        let analysis = analyze_hotel_preferences(&model, &hotel_deck()[..2]).await.unwrap();
        assert_eq!(analysis.personality, "自然派ラグジュアリー");
        assert_eq!(analysis.recommendations[0].tags.len(), 3);
        assert!(model.prompts.lock().unwrap()[0].contains("Aman Kyoto (Nature, Luxury, Secluded, Forest)"));
    }

    #[actix_rt::test]
    async fn garbage_reply_yields_none() {
        let model = CannedModel::replying("I like hotels");
        assert!(analyze_hotel_preferences(&model, &hotel_deck()).await.is_none());
    }
}
