use std::env;

use axum::http::HeaderMap;

/// Spotify application credentials and endpoints.
///
/// Credentials are optional on purpose: each handler reports its own
/// misconfiguration, so a deployment without the OAuth setup finished can
/// still serve everything else.
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Explicit redirect URI override; derived from forwarded headers when
    /// absent.
    pub redirect_uri: Option<String>,
    /// Accounts host (authorize + token endpoints).
    pub accounts_url: String,
    /// API host (currently-playing endpoint).
    pub api_url: String,
}

impl SpotifyConfig {
    pub fn from_env() -> Self {
        Self {
            client_id: optional_env("SPOTIFY_CLIENT_ID"),
            client_secret: optional_env("SPOTIFY_CLIENT_SECRET"),
            refresh_token: optional_env("SPOTIFY_REFRESH_TOKEN"),
            redirect_uri: optional_env("SPOTIFY_REDIRECT_URI"),
            accounts_url: env_or("SPOTIFY_ACCOUNTS_URL", "https://accounts.spotify.com"),
            api_url: env_or("SPOTIFY_API_URL", "https://api.spotify.com"),
        }
    }

    /// Returns the redirect URI sent to the authorize and token endpoints.
    ///
    /// Uses the explicit override when configured, otherwise derives it from
    /// the forwarded-proto/host headers the hosting proxy reports.
    pub fn resolve_redirect_uri(&self, headers: &HeaderMap) -> String {
        if let Some(uri) = &self.redirect_uri {
            return uri.clone();
        }

        let proto = header_str(headers, "x-forwarded-proto").unwrap_or("https");
        let host = header_str(headers, "x-forwarded-host")
            .or_else(|| header_str(headers, "host"))
            .unwrap_or("localhost");

        format!("{proto}://{host}/api/spotify/callback")
    }
}

/// Transactional mail credentials for the contact relay.
#[derive(Clone)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub api_url: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: optional_env("RESEND_API_KEY"),
            from_address: optional_env("CONTACT_FROM_EMAIL"),
            to_address: optional_env("CONTACT_TO_EMAIL"),
            api_url: env_or("RESEND_API_URL", "https://api.resend.com"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub spotify: SpotifyConfig,
    pub mail: MailConfig,
    /// The deployment's own URL, used by the contact relay's origin filter.
    pub public_url: Option<String>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_env() -> color_eyre::Result<Self> {
        let http = reqwest::ClientBuilder::new().use_rustls_tls().build()?;

        Ok(Self {
            spotify: SpotifyConfig::from_env(),
            mail: MailConfig::from_env(),
            public_url: optional_env("PUBLIC_URL"),
            http,
        })
    }
}

/// A set-but-blank variable counts as absent, matching how operators clear
/// values in the deployment dashboard.
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    optional_env(name).unwrap_or_else(|| default.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
