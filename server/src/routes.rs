use axum::routing::{get, post};
use tower_cookies::CookieManagerLayer;

use crate::state::AppState;

pub mod contact;
pub mod spotify;

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        // Contact relay
        .route("/api/contact", post(contact::submit))
        // Spotify OAuth bootstrap + now-playing proxy
        .route("/api/spotify/authorize", get(spotify::authorize))
        .route("/api/spotify/callback", get(spotify::callback))
        .route("/api/spotify/now-playing", get(spotify::now_playing))
        .layer(CookieManagerLayer::new())
        // Add trace layer for debugging
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}
