mod common;

use common::{app_state, client, configured_mail, offline_spotify, serve_app, unconfigured_mail};
use fixtures::{resend_router, serve, ResendFixture};
use portfolio_api::state::MailConfig;
use serde_json::{json, Value};

/// App wired to a mock mail provider; returns the fixture handle so tests
/// can inspect what was relayed.
async fn contact_app(fixture: ResendFixture) -> String {
    let (base, _handle) = serve(resend_router(fixture)).await.unwrap();
    serve_app(app_state(offline_spotify(), configured_mail(&base))).await
}

fn form(message: &str) -> Value {
    json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": message,
    })
}

async fn post_contact(app: &str, body: &Value) -> reqwest::Response {
    client()
        .post(format!("{app}/api/contact"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn relays_a_message_with_reply_to() {
    let fixture = ResendFixture::new();
    let app = contact_app(fixture.clone()).await;

    let response = post_contact(&app, &form("Hello there")).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["cache-control"], "no-store");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true, "id": "fixture-email-id" }));

    let sent = fixture.last_sent().expect("the fixture saw no message");
    assert_eq!(sent["reply_to"], json!("ada@example.com"));
    assert_eq!(sent["to"], json!(["owner@folio.example"]));
    assert_eq!(sent["subject"], json!("Portfolio message from Ada"));
    assert!(sent["text"].as_str().unwrap().contains("Hello there"));
}

#[tokio::test]
async fn accepts_a_message_at_the_cap() {
    let app = contact_app(ResendFixture::new()).await;

    let response = post_contact(&app, &form(&"a".repeat(5000))).await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn rejects_a_message_over_the_cap() {
    let fixture = ResendFixture::new();
    let app = contact_app(fixture.clone()).await;

    let response = post_contact(&app, &form(&"a".repeat(5001))).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], json!("Message too long"));
    assert!(fixture.last_sent().is_none());
}

#[tokio::test]
async fn names_the_first_missing_field() {
    let app = contact_app(ResendFixture::new()).await;

    let response = post_contact(
        &app,
        &json!({ "email": "ada@example.com", "message": "Hello" }),
    )
    .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], json!("Missing field: name"));
}

#[tokio::test]
async fn rejects_an_invalid_email() {
    let app = contact_app(ResendFixture::new()).await;

    let response = post_contact(
        &app,
        &json!({ "name": "Ada", "email": "ada.example.com", "message": "Hello" }),
    )
    .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], json!("Invalid email"));
}

#[tokio::test]
async fn rejects_a_foreign_origin() {
    let fixture = ResendFixture::new();
    let app = contact_app(fixture.clone()).await;

    let response = client()
        .post(format!("{app}/api/contact"))
        .header("Origin", "https://evil.example")
        .json(&form("Hello"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert!(fixture.last_sent().is_none());
}

#[tokio::test]
async fn allows_a_localhost_origin() {
    let app = contact_app(ResendFixture::new()).await;

    let response = client()
        .post(format!("{app}/api/contact"))
        .header("Origin", "http://localhost:5173")
        .json(&form("Hello"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn falls_back_to_mailto_when_unconfigured() {
    let mail = MailConfig {
        to_address: Some("owner@folio.example".to_string()),
        ..unconfigured_mail()
    };
    let app = serve_app(app_state(offline_spotify(), mail)).await;

    let response = post_contact(&app, &form("Hello")).await;

    assert_eq!(response.status(), 501);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["fallback"], json!("mailto"));
    assert_eq!(body["to"], json!("owner@folio.example"));
}

#[tokio::test]
async fn collapses_provider_failure_to_a_generic_error() {
    let app = contact_app(ResendFixture::failing(500)).await;

    let response = post_contact(&app, &form("Hello")).await;

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "ok": false, "error": "Email send failed" }));
}

#[tokio::test]
async fn rejects_get_requests() {
    let app = serve_app(app_state(offline_spotify(), unconfigured_mail())).await;

    let response = client()
        .get(format!("{app}/api/contact"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
    let allow = response.headers()["allow"].to_str().unwrap();
    assert!(allow.contains("POST"));
}
