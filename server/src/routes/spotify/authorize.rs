use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_macros::debug_handler;
use serde::Serialize;
use tower_cookies::Cookies;
use tracing::info;

use crate::errors::ServerResult;
use crate::spotify::state_token::StateToken;
use crate::state::AppState;

/// Scopes needed to read playback state, and nothing else.
const SCOPES: &str = "user-read-currently-playing user-read-playback-state";

#[derive(Serialize)]
struct AuthorizeUrlParams<'a> {
    response_type: &'static str,
    client_id: &'a str,
    scope: &'static str,
    redirect_uri: &'a str,
    state: &'a str,
    /// Always re-render the consent dialog so a second authorization lets
    /// the operator confirm.
    show_dialog: &'static str,
}

/// Start the Spotify OAuth flow: set the anti-CSRF state cookie and redirect
/// to the consent screen.
#[debug_handler(state = AppState)]
pub async fn authorize(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> ServerResult<Response, StatusCode> {
    let Some(client_id) = state.spotify.client_id.as_deref() else {
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, "Missing SPOTIFY_CLIENT_ID").into_response());
    };

    let redirect_uri = state.spotify.resolve_redirect_uri(&headers);
    let token = StateToken::generate();

    let query = serde_urlencoded::to_string(AuthorizeUrlParams {
        response_type: "code",
        client_id,
        scope: SCOPES,
        redirect_uri: &redirect_uri,
        state: token.as_str(),
        show_dialog: "true",
    })?;

    cookies.add(token.into_cookie());

    let location = format!("{}/authorize?{}", state.spotify.accounts_url, query);
    info!("Redirecting to the Spotify consent screen");

    // The consent redirect is a plain 302 with caching disabled.
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response())
}
