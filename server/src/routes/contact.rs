use std::sync::OnceLock;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_macros::debug_handler;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::mail::{self, ContactMessage};
use crate::state::AppState;

const MAX_MESSAGE_CHARS: usize = 5000;

/// Preview deployments live under this suffix. A coarse filter, not a
/// security boundary.
const PREVIEW_DOMAIN_SUFFIX: &str = "vercel.app";

#[derive(Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Validate and forward a visitor message to the mail provider.
#[debug_handler(state = AppState)]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Response {
    if !origin_allowed(&headers, state.public_url.as_deref()) {
        return respond(
            StatusCode::FORBIDDEN,
            json!({ "ok": false, "error": "Forbidden" }),
        );
    }

    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();

    if let Err(reason) = validate(name, email, message) {
        return respond(
            StatusCode::BAD_REQUEST,
            json!({ "ok": false, "error": reason }),
        );
    }

    let mail_config = &state.mail;
    let (Some(api_key), Some(from_address), Some(to_address)) = (
        mail_config.api_key.as_deref(),
        mail_config.from_address.as_deref(),
        mail_config.to_address.as_deref(),
    ) else {
        // Degrade to a mailto hint instead of failing hard.
        return respond(
            StatusCode::NOT_IMPLEMENTED,
            json!({
                "ok": false,
                "error": "Email provider not configured",
                "fallback": "mailto",
                "to": mail_config.to_address,
            }),
        );
    };

    let outcome = mail::send_contact_email(
        &state.http,
        &mail_config.api_url,
        api_key,
        from_address,
        to_address,
        &ContactMessage {
            name,
            email,
            message,
        },
    )
    .await;

    match outcome {
        Ok(id) => {
            info!("Relayed a contact message");
            respond(StatusCode::OK, json!({ "ok": true, "id": id }))
        }
        Err(err) => {
            // Provider detail stays server-side.
            error!(error = ?err, "Contact relay failed");
            respond(
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "error": "Email send failed" }),
            )
        }
    }
}

/// Names the first failing field, so the form can point at it.
fn validate(name: &str, email: &str, message: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Missing field: name");
    }
    if email.is_empty() {
        return Err("Missing field: email");
    }
    if message.is_empty() {
        return Err("Missing field: message");
    }
    if !email_shape().is_match(email) {
        return Err("Invalid email");
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err("Message too long");
    }
    Ok(())
}

fn email_shape() -> &'static Regex {
    static EMAIL_SHAPE: OnceLock<Regex> = OnceLock::new();
    EMAIL_SHAPE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// Coarse origin allow-list: local development, the platform's preview
/// domains, or the deployment's own URL. Callers without an origin (curl,
/// server-to-server) pass.
fn origin_allowed(headers: &HeaderMap, public_url: Option<&str>) -> bool {
    let origin = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .and_then(|value| value.to_str().ok());

    let Some(origin) = origin else {
        return true;
    };

    origin.contains("localhost")
        || origin.contains(PREVIEW_DOMAIN_SUFFIX)
        || public_url.is_some_and(|url| !url.is_empty() && origin.contains(url))
}

fn respond(status: StatusCode, body: serde_json::Value) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_submission() {
        assert_eq!(validate("Ada", "ada@example.com", "Hello there"), Ok(()));
    }

    #[test]
    fn names_the_first_missing_field() {
        assert_eq!(
            validate("", "ada@example.com", "Hello"),
            Err("Missing field: name")
        );
        assert_eq!(validate("Ada", "", "Hello"), Err("Missing field: email"));
        assert_eq!(
            validate("Ada", "ada@example.com", ""),
            Err("Missing field: message")
        );
    }

    #[test]
    fn rejects_addresses_without_an_at_sign() {
        assert_eq!(
            validate("Ada", "ada.example.com", "Hello"),
            Err("Invalid email")
        );
        assert_eq!(
            validate("Ada", "ada@example com", "Hello"),
            Err("Invalid email")
        );
    }

    #[test]
    fn message_cap_is_inclusive() {
        let at_cap = "a".repeat(MAX_MESSAGE_CHARS);
        let over_cap = "a".repeat(MAX_MESSAGE_CHARS + 1);

        assert_eq!(validate("Ada", "ada@example.com", &at_cap), Ok(()));
        assert_eq!(
            validate("Ada", "ada@example.com", &over_cap),
            Err("Message too long")
        );
    }

    fn headers_with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, origin.parse().unwrap());
        headers
    }

    #[test]
    fn absent_origin_is_allowed() {
        assert!(origin_allowed(&HeaderMap::new(), None));
    }

    #[test]
    fn local_and_preview_origins_are_allowed() {
        assert!(origin_allowed(
            &headers_with_origin("http://localhost:5173"),
            None
        ));
        assert!(origin_allowed(
            &headers_with_origin("https://branch-preview.vercel.app"),
            None
        ));
    }

    #[test]
    fn deployment_url_is_allowed() {
        assert!(origin_allowed(
            &headers_with_origin("https://folio.example"),
            Some("folio.example")
        ));
    }

    #[test]
    fn unknown_origins_are_rejected() {
        assert!(!origin_allowed(
            &headers_with_origin("https://evil.example"),
            Some("folio.example")
        ));
    }

    #[test]
    fn referer_is_checked_when_origin_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, "https://evil.example/form".parse().unwrap());
        assert!(!origin_allowed(&headers, None));
    }
}
