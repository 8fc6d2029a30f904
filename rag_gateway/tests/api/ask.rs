use fake::faker::lorem::en::Sentence;
use fake::Fake;
use reqwest::header::{ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use serde_json::json;

use crate::helpers::spawn_app;

#[tokio::test]
async fn ask_returns_a_400_when_a_field_is_missing() {
    // Arranges
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let question: String = Sentence(3..8).fake();

    let test_cases = vec![
        (json!({ "collection": "knowledge_base" }), "missing the text"),
        (json!({ "text": question }), "missing the collection"),
        (json!({}), "missing everything"),
    ];

    for (invalid_body, error_message) in test_cases {
        // Acts
        let response = client
            .post(&format!("{}/ask", &app.address))
            .json(&invalid_body)
            .send()
            .await
            .expect("Failed to execute request");

        // Asserts
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
}

#[tokio::test]
async fn ask_grants_cors_to_a_preflight_from_the_allowed_origin() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, &format!("{}/ask", &app.address))
        .header(ORIGIN, "http://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn ask_denies_cors_to_a_preflight_from_another_origin() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, &format!("{}/ask", &app.address))
        .header(ORIGIN, "http://not-the-frontend.example")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
