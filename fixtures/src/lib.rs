use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Common CLI arguments for all fixture servers
#[derive(Parser, Debug, Clone)]
pub struct FixtureArgs {
    /// The port to listen on
    #[arg(short, long, default_value = "0")]
    pub port: u16,

    /// The host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
}

/// Common function to run a fixture server binary
pub async fn run_server(args: FixtureArgs, app: Router) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let addr = format!("{}:{}", args.host, args.port).parse::<SocketAddr>()?;

    let app = app.layer(TraceLayer::new_for_http());

    info!("Fixture server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind a router to an ephemeral localhost port and serve it in the
/// background. Integration tests point the application's base URLs here.
pub async fn serve(app: Router) -> anyhow::Result<(String, tokio::task::JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{addr}"), handle))
}

// Spotify fixture

/// Canned behavior for the mock Spotify hosts. One router stands in for both
/// the accounts host (token endpoint) and the API host (currently-playing).
#[derive(Debug, Clone)]
pub struct SpotifyFixture {
    /// Status answered by POST /api/token.
    pub token_status: u16,
    /// Raw body answered by POST /api/token.
    pub token_body: String,
    /// Status answered by GET /v1/me/player/currently-playing.
    pub playing_status: u16,
    /// Raw body answered by the currently-playing endpoint.
    pub playing_body: String,
}

impl SpotifyFixture {
    /// Token endpoint grants both tokens; nothing is playing.
    pub fn idle() -> Self {
        Self {
            token_status: 200,
            token_body: json!({
                "access_token": "fixture-access-token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "fixture-refresh-token",
                "scope": "user-read-currently-playing user-read-playback-state",
            })
            .to_string(),
            playing_status: 204,
            playing_body: String::new(),
        }
    }

    /// Token endpoint grants both tokens; the given playback body is served
    /// with a 200.
    pub fn playing(body: Value) -> Self {
        Self {
            playing_status: 200,
            playing_body: body.to_string(),
            ..Self::idle()
        }
    }

    pub fn with_token_response(mut self, status: u16, body: Value) -> Self {
        self.token_status = status;
        self.token_body = body.to_string();
        self
    }

    pub fn with_playing_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.playing_status = status;
        self.playing_body = body.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenForm {
    grant_type: String,
}

pub fn spotify_router(fixture: SpotifyFixture) -> Router {
    Router::new()
        .route("/api/token", post(token))
        .route("/v1/me/player/currently-playing", get(currently_playing))
        .route("/authorize", get(consent_screen))
        .with_state(fixture)
}

async fn token(
    State(fixture): State<SpotifyFixture>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    // Both grants authenticate with HTTP Basic; refusing anything else makes
    // the happy-path tests pin the request shape too.
    let has_basic_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));
    if !has_basic_auth {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    if form.grant_type != "authorization_code" && form.grant_type != "refresh_token" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    raw_json(fixture.token_status, fixture.token_body)
}

async fn currently_playing(State(fixture): State<SpotifyFixture>, headers: HeaderMap) -> Response {
    let has_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "));
    if !has_bearer {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "no token" })),
        )
            .into_response();
    }

    raw_json(fixture.playing_status, fixture.playing_body)
}

async fn consent_screen() -> &'static str {
    "fixture consent screen"
}

fn raw_json(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

// Mail fixture

/// Mock transactional-mail API. Captures the last request body so tests can
/// assert on the relayed message.
#[derive(Clone, Default)]
pub struct ResendFixture {
    fail_with: Option<u16>,
    sent: Arc<Mutex<Option<Value>>>,
}

impl ResendFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            sent: Arc::default(),
        }
    }

    /// The body of the last /emails request, if any arrived.
    pub fn last_sent(&self) -> Option<Value> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn resend_router(fixture: ResendFixture) -> Router {
    Router::new()
        .route("/emails", post(send_email))
        .with_state(fixture)
}

async fn send_email(State(fixture): State<ResendFixture>, Json(body): Json<Value>) -> Response {
    info!("Mail fixture received a message");
    *fixture.sent.lock().unwrap() = Some(body);

    if let Some(status) = fixture.fail_with {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "message": "fixture failure" }))).into_response();
    }

    Json(json!({ "id": "fixture-email-id" })).into_response()
}
