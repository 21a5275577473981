//! Spotify provider client: token-endpoint grants and the currently-playing
//! query, normalized into the snapshot the widget consumes.

pub mod state_token;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("token endpoint request failed")]
    TokenRequest(#[source] reqwest::Error),
    #[error("token endpoint returned {0}")]
    TokenStatus(StatusCode),
    #[error("token endpoint returned an unparsable body")]
    TokenBody(#[source] reqwest::Error),
    #[error("token response did not include an access token")]
    MissingAccessToken,
}

/// Grant returned by the token endpoint. Fields the provider may omit stay
/// optional; callers decide which ones they require.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Exchange a one-time authorization code for a token grant.
pub async fn exchange_code(
    http: &reqwest::Client,
    accounts_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenGrant, SpotifyError> {
    let response = http
        .post(format!("{accounts_url}/api/token"))
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .map_err(SpotifyError::TokenRequest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SpotifyError::TokenStatus(status));
    }

    response.json().await.map_err(SpotifyError::TokenBody)
}

/// Mint a short-lived access token from the long-lived refresh token.
///
/// Runs on every now-playing request; the access token is never cached.
pub async fn refresh_access_token(
    http: &reqwest::Client,
    accounts_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<String, SpotifyError> {
    let response = http
        .post(format!("{accounts_url}/api/token"))
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await
        .map_err(SpotifyError::TokenRequest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SpotifyError::TokenStatus(status));
    }

    let grant: TokenGrant = response.json().await.map_err(SpotifyError::TokenBody)?;
    grant.access_token.ok_or(SpotifyError::MissingAccessToken)
}

/// Point-in-time playback projection served to the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_image_url: Option<String>,
}

impl PlaybackSnapshot {
    /// The degraded default: served whenever nothing is playing or any
    /// upstream step misbehaves.
    pub fn not_playing() -> Self {
        Self {
            is_playing: false,
            title: None,
            artist: None,
            song_url: None,
            album_image_url: None,
        }
    }
}

/// Outcome of one currently-playing query. The split keeps the
/// fail-open-to-not-playing policy an explicit branch at the call site.
#[derive(Debug)]
pub enum Playback {
    /// A track is playing and the snapshot is ready to serve.
    Playing(PlaybackSnapshot),
    /// The provider reported no active playback: 202/204, a paused player,
    /// or a playing flag without a track item.
    Empty,
    /// Transport failure, non-success status, or a body that did not parse.
    MalformedUpstream,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingBody {
    #[serde(default)]
    is_playing: bool,
    item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    name: Option<String>,
    artists: Option<Vec<TrackArtist>>,
    external_urls: Option<ExternalUrls>,
    album: Option<TrackAlbum>,
}

#[derive(Debug, Deserialize)]
struct TrackArtist {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackAlbum {
    images: Option<Vec<AlbumImage>>,
}

#[derive(Debug, Deserialize)]
struct AlbumImage {
    url: Option<String>,
}

/// Query the currently-playing endpoint with a fresh access token.
pub async fn currently_playing(
    http: &reqwest::Client,
    api_url: &str,
    access_token: &str,
) -> Playback {
    let response = match http
        .get(format!("{api_url}/v1/me/player/currently-playing"))
        .bearer_auth(access_token)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            warn!(error = ?err, "currently-playing request failed");
            return Playback::MalformedUpstream;
        }
    };

    let status = response.status();
    // 204 is "nothing playing"; 202 is the provider still warming the answer.
    if status == StatusCode::NO_CONTENT || status == StatusCode::ACCEPTED {
        return Playback::Empty;
    }
    if !status.is_success() {
        warn!(%status, "currently-playing returned non-success");
        return Playback::MalformedUpstream;
    }

    match response.json::<CurrentlyPlayingBody>().await {
        Ok(body) => normalize(body),
        Err(err) => {
            warn!(error = ?err, "currently-playing body did not parse");
            Playback::MalformedUpstream
        }
    }
}

/// A snapshot counts as playing only when the provider both asserts
/// `is_playing` and supplies a track item.
fn normalize(body: CurrentlyPlayingBody) -> Playback {
    let Some(item) = body.item else {
        return Playback::Empty;
    };
    if !body.is_playing {
        return Playback::Empty;
    }

    let artist = item
        .artists
        .unwrap_or_default()
        .into_iter()
        .filter_map(|artist| artist.name)
        .collect::<Vec<_>>()
        .join(", ");

    Playback::Playing(PlaybackSnapshot {
        is_playing: true,
        title: Some(item.name.unwrap_or_default()),
        artist: Some(artist),
        song_url: Some(
            item.external_urls
                .and_then(|urls| urls.spotify)
                .unwrap_or_default(),
        ),
        album_image_url: Some(
            item.album
                .and_then(|album| album.images)
                .and_then(|images| images.into_iter().next())
                .and_then(|image| image.url)
                .unwrap_or_default(),
        ),
    })
}
