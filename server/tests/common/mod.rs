#![allow(dead_code)]

use portfolio_api::routes::routes;
use portfolio_api::state::{AppState, MailConfig, SpotifyConfig};

/// Fully-configured Spotify settings pointed at the given base URLs
/// (usually a fixture server).
pub fn spotify_config(accounts_url: &str, api_url: &str) -> SpotifyConfig {
    SpotifyConfig {
        client_id: Some("test-client-id".to_string()),
        client_secret: Some("test-client-secret".to_string()),
        refresh_token: Some("test-refresh-token".to_string()),
        redirect_uri: Some("https://folio.example/api/spotify/callback".to_string()),
        accounts_url: accounts_url.to_string(),
        api_url: api_url.to_string(),
    }
}

/// Spotify settings for tests that never touch the provider.
pub fn offline_spotify() -> SpotifyConfig {
    spotify_config("http://127.0.0.1:9", "http://127.0.0.1:9")
}

/// Mail settings with no credentials, pointed at a dead port so an
/// accidental send fails loudly.
pub fn unconfigured_mail() -> MailConfig {
    MailConfig {
        api_key: None,
        from_address: None,
        to_address: None,
        api_url: "http://127.0.0.1:9".to_string(),
    }
}

pub fn configured_mail(api_url: &str) -> MailConfig {
    MailConfig {
        api_key: Some("test-api-key".to_string()),
        from_address: Some("site@folio.example".to_string()),
        to_address: Some("owner@folio.example".to_string()),
        api_url: api_url.to_string(),
    }
}

pub fn app_state(spotify: SpotifyConfig, mail: MailConfig) -> AppState {
    AppState {
        spotify,
        mail,
        public_url: None,
        http: reqwest::Client::new(),
    }
}

/// Serve the real router on an ephemeral port and return its base URL.
pub async fn serve_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, routes(state)).await;
    });

    format!("http://{addr}")
}

/// Client that keeps redirects unfollowed so the authorize 302 can be
/// inspected.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
