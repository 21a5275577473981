use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_macros::debug_handler;
use serde::Serialize;
use tracing::warn;

use crate::spotify::{self, Playback, PlaybackSnapshot, SpotifyError};
use crate::state::AppState;

/// Playback changes slowly relative to the widget's 25-second polling
/// cadence, so the edge may serve it briefly.
const CACHE_POLICY: &str = "s-maxage=30, stale-while-revalidate=60";

#[derive(Serialize)]
struct MissingConfig {
    error: &'static str,
    missing: MissingVars,
}

#[derive(Serialize)]
struct MissingVars {
    #[serde(rename = "SPOTIFY_CLIENT_ID")]
    client_id: bool,
    #[serde(rename = "SPOTIFY_CLIENT_SECRET")]
    client_secret: bool,
    #[serde(rename = "SPOTIFY_REFRESH_TOKEN")]
    refresh_token: bool,
}

/// Widget-facing playback proxy. Every failure past the configuration check
/// degrades to the not-playing snapshot; the widget never sees a 5xx.
#[debug_handler(state = AppState)]
pub async fn now_playing(State(state): State<AppState>) -> Response {
    let spotify_config = &state.spotify;
    let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
        spotify_config.client_id.as_deref(),
        spotify_config.client_secret.as_deref(),
        spotify_config.refresh_token.as_deref(),
    ) else {
        let body = MissingConfig {
            error: "Missing Spotify configuration",
            missing: MissingVars {
                client_id: spotify_config.client_id.is_none(),
                client_secret: spotify_config.client_secret.is_none(),
                refresh_token: spotify_config.refresh_token.is_none(),
            },
        };
        return cached_json(StatusCode::INTERNAL_SERVER_ERROR, Json(body));
    };

    let snapshot = fetch_snapshot(&state, client_id, client_secret, refresh_token)
        .await
        .unwrap_or_else(|err| {
            warn!(error = ?err, "Degrading to the not-playing snapshot");
            PlaybackSnapshot::not_playing()
        });

    cached_json(StatusCode::OK, Json(snapshot))
}

async fn fetch_snapshot(
    state: &AppState,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<PlaybackSnapshot, SpotifyError> {
    let access_token = spotify::refresh_access_token(
        &state.http,
        &state.spotify.accounts_url,
        client_id,
        client_secret,
        refresh_token,
    )
    .await?;

    let snapshot =
        match spotify::currently_playing(&state.http, &state.spotify.api_url, &access_token).await {
            Playback::Playing(snapshot) => snapshot,
            Playback::Empty | Playback::MalformedUpstream => PlaybackSnapshot::not_playing(),
        };

    Ok(snapshot)
}

fn cached_json(status: StatusCode, body: impl IntoResponse) -> Response {
    (status, [(header::CACHE_CONTROL, CACHE_POLICY)], body).into_response()
}
