use rand::RngCore;
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::Cookie;

/// Cookie that round-trips the anti-CSRF state between the authorize
/// redirect and the provider callback.
pub const STATE_COOKIE: &str = "spotify_oauth_state";

const STATE_BYTES: usize = 16;
const STATE_TTL_SECONDS: i64 = 10 * 60;

/// Single-use anti-CSRF token for the authorization-code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a fresh 128-bit token, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; STATE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The callback accepts a presented state only when both sides are
    /// present and byte-equal. Absence on either side is a failure, never a
    /// silent pass.
    pub fn matches(expected: Option<&str>, presented: Option<&str>) -> bool {
        match (expected, presented) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }

    /// Cookie carrying the token to the callback: ten minutes, HttpOnly,
    /// Secure, SameSite=Lax, path-wide.
    pub fn into_cookie(self) -> Cookie<'static> {
        Cookie::build((STATE_COOKIE, self.0))
            .path("/")
            .max_age(Duration::seconds(STATE_TTL_SECONDS))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true)
            .build()
    }

    /// Expired twin of the state cookie, added on callback entry so the
    /// token cannot be replayed whatever the outcome.
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build((STATE_COOKIE, ""))
            .path("/")
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true)
            .build()
    }
}
