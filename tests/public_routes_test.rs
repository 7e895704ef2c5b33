mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use serde_json::json;

use mirutabi_api::routes::oauth_state::{GOOGLE_STATE_COOKIE, SPOTIFY_STATE_COOKIE};

use common::TestApp;

#[actix_rt::test]
async fn test_hotel_deck_lists_all_cards() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/hotels/deck").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    let deck = body.as_array().expect("array");
    assert_eq!(deck.len(), 10);
    assert!(deck[0]["priceRange"].is_string());
}

#[actix_rt::test]
async fn test_diagnosis_questions() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/diagnosis/questions")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["questions"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["questions"][0]["id"], 1);
}

#[actix_rt::test]
async fn test_anonymous_diagnosis_is_not_saved() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/diagnosis")
        .set_json(json!({ "answers": [0, 0, 2, 0, 0] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["style"], "爆速コスパ");
    assert_eq!(body["total_score"], 5);
    assert_eq!(body["saved"], false);
}

#[actix_rt::test]
async fn test_incomplete_diagnosis_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/diagnosis")
        .set_json(json!({ "answers": [0, 1] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Expected 5 answers"));
}

#[actix_rt::test]
async fn test_instant_booking_confirms_chosen_option() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/booking/instant")
        .set_json(json!({ "destination": "那覇", "option": 1 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["step"], "confirmed");
    assert_eq!(body["options"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["confirmation"]["total"], 52000);
    assert_eq!(body["confirmation"]["destination"], "那覇");
}

#[actix_rt::test]
async fn test_timeline_move_renumbers_stops() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/plans/timeline")
        .set_json(json!({
            "stops": [
                { "spot_id": "a", "order": 1, "type": "activity", "notes": "金閣寺", "cost_estimate": 500.0 },
                { "spot_id": "b", "order": 2, "type": "meal", "notes": "錦市場", "cost_estimate": 1500.0 },
                { "spot_id": "c", "order": 3, "type": "activity", "notes": "清水寺", "cost_estimate": 400.0 }
            ],
            "edit": { "edit": "move", "from": 2, "to": 0 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["stops"][0]["notes"], "清水寺");
    assert_eq!(body["stops"][0]["order"], 1);
    assert_eq!(body["stops"][2]["order"], 3);
    assert_eq!(body["summary"]["total_cost"], 2400.0);
}

#[actix_rt::test]
async fn test_plan_generation_without_model_key() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/plans/generate")
        .set_json(json!({ "user_input": "京都で紅葉を見たい" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Gemini API key not configured");
}

#[actix_rt::test]
async fn test_vision_without_model_returns_null_location() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/vision/location")
        .set_json(json!({ "image": "data:image/png;base64,iVBORw0KGgo=" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["location"].is_null());
}

#[actix_rt::test]
async fn test_blank_weather_city_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/weather?city=%20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_malformed_json_uses_error_shape() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/booking/instant")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_spotify_me_without_cookie_is_disconnected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/spotify/me").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isConnected"], false);
    assert_eq!(body["topArtists"], json!([]));
}

#[actix_rt::test]
async fn test_spotify_denied_redirects_to_planner() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/spotify/callback?error=access_denied")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "http://localhost:3000/plan?error=spotify_access_denied"
    );
}

#[actix_rt::test]
async fn test_spotify_callback_without_code() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/spotify/callback")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "http://localhost:3000/plan?error=no_code"
    );
}

#[actix_rt::test]
async fn test_spotify_callback_with_mismatched_state() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let forged = test::TestRequest::get()
        .uri("/api/spotify/callback?code=abc&state=forged")
        .to_request();
    let resp = test::call_service(&app, forged).await;
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "http://localhost:3000/plan?error=spotify_state_mismatch"
    );

    let stale = test::TestRequest::get()
        .uri("/api/spotify/callback?code=abc&state=forged")
        .cookie(Cookie::new(SPOTIFY_STATE_COOKIE, "issued-state"))
        .to_request();
    let resp = test::call_service(&app, stale).await;
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "http://localhost:3000/plan?error=spotify_state_mismatch"
    );
}

#[actix_rt::test]
async fn test_google_callback_with_mismatched_state() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/google/callback?code=abc&state=forged")
        .cookie(Cookie::new(GOOGLE_STATE_COOKIE, "issued-state"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid OAuth state");
}
