use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_macros::debug_handler;
use maud::html;
use serde::Deserialize;
use tower_cookies::Cookies;
use tracing::{error, info, warn};

use crate::components::Page;
use crate::spotify;
use crate::spotify::state_token::{StateToken, STATE_COOKIE};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Provider redirect target: validate the handshake, exchange the code, and
/// show the operator the refresh token exactly once.
#[debug_handler(state = AppState)]
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (Some(client_id), Some(client_secret)) = (
        state.spotify.client_id.as_deref(),
        state.spotify.client_secret.as_deref(),
    ) else {
        return misconfigured_page().into_response();
    };

    // The cookie is single-use: read the expected state, then clear it ahead
    // of every exit below.
    let expected_state = cookies
        .get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_string());
    cookies.add(StateToken::removal_cookie());

    if let Some(provider_error) = params.error {
        warn!(error = %provider_error, "Spotify reported an authorization error");
        return provider_error_page(&provider_error).into_response();
    }

    let Some(code) = params.code else {
        warn!("Callback arrived without an authorization code");
        return missing_code_page().into_response();
    };

    if !StateToken::matches(expected_state.as_deref(), params.state.as_deref()) {
        warn!("State mismatch on callback");
        return invalid_state_page().into_response();
    }

    let redirect_uri = state.spotify.resolve_redirect_uri(&headers);

    let grant = match spotify::exchange_code(
        &state.http,
        &state.spotify.accounts_url,
        client_id,
        client_secret,
        &code,
        &redirect_uri,
    )
    .await
    {
        Ok(grant) => grant,
        Err(err) => {
            error!(error = ?err, "Token exchange failed");
            return exchange_failed_page().into_response();
        }
    };

    // Spotify only issues a refresh token on the first-ever consent for this
    // app and account; a grant without one is a normal, recoverable outcome.
    let Some(refresh_token) = grant.refresh_token else {
        info!("Exchange succeeded but the grant carried no refresh token");
        return no_refresh_token_page().into_response();
    };

    info!("Issued a refresh token to the operator");
    refresh_token_page(&refresh_token).into_response()
}

fn misconfigured_page() -> Page {
    Page::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Missing server configuration",
        html! {
            p {
                "Set " code { "SPOTIFY_CLIENT_ID" } " and " code { "SPOTIFY_CLIENT_SECRET" }
                " in the deployment environment."
            }
        },
    )
}

fn provider_error_page(provider_error: &str) -> Page {
    Page::new(
        StatusCode::BAD_REQUEST,
        "Spotify auth error",
        html! { p { (provider_error) } },
    )
}

fn missing_code_page() -> Page {
    Page::new(
        StatusCode::BAD_REQUEST,
        "Missing code",
        html! { p { "No " code { "?code=" } " provided by Spotify." } },
    )
}

fn invalid_state_page() -> Page {
    Page::new(
        StatusCode::BAD_REQUEST,
        "Invalid state",
        html! { p { "Start again from " code { "/api/spotify/authorize" } "." } },
    )
}

fn exchange_failed_page() -> Page {
    Page::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Token exchange failed",
        html! { p { "Check the Spotify app settings and the server configuration." } },
    )
}

fn no_refresh_token_page() -> Page {
    Page::new(
        StatusCode::OK,
        "No refresh token returned",
        html! {
            p {
                "Spotify only returns a refresh token on the first consent. Remove the app "
                "under Spotify Account, Apps, then try again."
            }
        },
    )
}

fn refresh_token_page(refresh_token: &str) -> Page {
    Page::new(
        StatusCode::OK,
        "Spotify refresh token",
        html! {
            p {
                "Copy this value into the " code { "SPOTIFY_REFRESH_TOKEN" }
                " environment variable (do not commit it):"
            }
            pre style="white-space: pre-wrap; word-break: break-all; padding: 12px; border: 1px solid #ddd; border-radius: 8px;" {
                (refresh_token)
            }
            p { "Then redeploy the site." }
        },
    )
}
