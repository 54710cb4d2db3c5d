use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Safety margin before the recorded expiry at which a token stops counting
/// as valid, so requests never race the actual expiration.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Persisted OAuth session state.
///
/// # Example
/// ```
/// use chrono::{Duration, Utc};
/// use discolog::auth::Token;
///
/// let token = Token {
///     access_token: "access".to_string(),
///     expires_at: Utc::now() + Duration::hours(1),
///     refresh_token: Some("refresh".to_string()),
/// };
/// assert!(token.is_valid());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
}

impl Token {
    /// Whether the token is usable at `now`: an access token is present and
    /// `now` is more than the safety margin before the expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty()
            && now < self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
