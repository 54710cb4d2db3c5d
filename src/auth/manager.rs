//! Token lifecycle manager: login redirect, code exchange, refresh, and
//! token handout for API calls.

use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::AuthError;
use super::pkce::PkceExchange;
use super::session::SessionStore;
use super::token::Token;
use crate::navigate::{page_redirect_uri, without_query_params, Navigator};
use crate::store::KeyValueStore;

const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Fallback token lifetime when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Redirect handed back by [`AuthManager::start_login`].
///
/// By the time the caller sees this the navigator has already been told to
/// leave the page; the value exists so tests and status displays can inspect
/// where the user went.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub authorize_url: String,
    pub state: String,
}

/// Outcome of [`AuthManager::get_access_token`].
#[derive(Debug, Clone)]
pub enum TokenAccess {
    /// A currently valid bearer token.
    Bearer(String),
    /// Interactive login was started; the page is navigating away and the
    /// caller must not continue.
    Redirecting(LoginRedirect),
}

/// Owns acquisition, validation, refresh, and use of the OAuth bearer token.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use discolog::auth::AuthManager;
/// use discolog::store::FileKeyValueStore;
/// # use discolog::navigate::Navigator;
/// # fn navigator() -> Arc<dyn Navigator> { unimplemented!() }
///
/// let store = Arc::new(FileKeyValueStore::new_default());
/// let auth = AuthManager::new(store, navigator());
/// if !auth.is_token_valid() {
///     let redirect = auth.start_login()?;
///     println!("navigating to {}", redirect.authorize_url);
/// }
/// # Ok::<(), discolog::auth::AuthError>(())
/// ```
pub struct AuthManager {
    client: reqwest::Client,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    authorize_url: String,
    token_url: String,
    // Single-flight guard: two parallel 401s must not both hit the token
    // endpoint.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl AuthManager {
    pub fn new(store: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client: reqwest::Client::new(),
            session: SessionStore::new(store),
            navigator,
            authorize_url: SPOTIFY_AUTHORIZE_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Access the persisted session behind this manager.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Pure validity check; no side effects.
    pub fn is_token_valid(&self) -> bool {
        self.session.is_token_valid()
    }

    /// Begin interactive login.
    ///
    /// Generates and persists a fresh `state`/verifier pair, then sends the
    /// navigator to the authorization endpoint with the S256 challenge. The
    /// current page load is over once the redirect lands; the returned value
    /// is informational.
    pub fn start_login(&self) -> Result<LoginRedirect, AuthError> {
        let client_id = self
            .session
            .client_id()?
            .ok_or(AuthError::MissingClientId)?;

        let exchange = PkceExchange::generate();
        let challenge = exchange.challenge();
        self.session.save_pkce(&exchange)?;

        let redirect_uri = page_redirect_uri(&self.navigator.current_url());
        let authorize_url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", challenge.as_str()),
                ("state", exchange.state.as_str()),
            ],
        )
        .map_err(|err| AuthError::InvalidResponse(format!("bad authorize URL: {err}")))?;

        debug!(state = %exchange.state, "starting interactive login");
        self.navigator.redirect(authorize_url.as_str());
        Ok(LoginRedirect {
            authorize_url: authorize_url.into(),
            state: exchange.state,
        })
    }

    /// Handle a possible OAuth redirect return. Called once per page load.
    ///
    /// When the current URL carries `code` and `state`, the state is checked
    /// against the persisted value, the code is exchanged, the transient PKCE
    /// pair is erased, and the visible URL is rewritten without the OAuth
    /// parameters. Returns whether a valid session now exists.
    pub async fn bootstrap_auth(&self) -> Result<bool, AuthError> {
        let url = self.navigator.current_url();
        let code = query_param(&url, "code");
        let returned_state = query_param(&url, "state");

        if let Some(code) = code {
            let stored_state = self.session.pending_state()?;
            match (&returned_state, &stored_state) {
                (Some(returned), Some(stored)) if returned == stored => {}
                _ => {
                    warn!("redirect return with missing or mismatched state");
                    return Err(AuthError::StateMismatch);
                }
            }
            self.exchange_code_for_token(&code).await?;
            self.session.clear_pkce()?;
            let cleaned = without_query_params(&url, &["code", "state"]);
            self.navigator.replace_url(&cleaned);
        }

        Ok(self.session.is_token_valid())
    }

    /// Exchange an authorization code for tokens and persist them.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<(), AuthError> {
        let client_id = self
            .session
            .client_id()?
            .ok_or(AuthError::MissingClientId)?;
        let verifier = self
            .session
            .pkce_verifier()?
            .ok_or(AuthError::MissingVerifier)?;
        let redirect_uri = page_redirect_uri(&self.navigator.current_url());

        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("code_verifier", verifier.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "code exchange rejected");
            return Err(AuthError::ExchangeFailed {
                status: status.as_u16(),
            });
        }

        let payload: TokenResponse = resp
            .json()
            .await
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;
        self.session.save_token(&token_from_response(payload))?;
        debug!("code exchange succeeded");
        Ok(())
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// Returns `false` without error when no refresh token or client id is
    /// available, or when the token endpoint rejects the refresh. Concurrent
    /// callers serialize here; a caller that finds the token already rotated
    /// after acquiring the lock skips the network round trip.
    pub async fn refresh_access_token(&self) -> bool {
        let before = match self.session.token() {
            Ok(token) => token.map(|t| t.access_token),
            Err(_) => None,
        };
        let _guard = self.refresh_lock.lock().await;
        // A concurrent caller may have rotated the token while we waited.
        // Only that counts as done: a token that merely still looks valid
        // locally may have been revoked server-side.
        if let Ok(Some(current)) = self.session.token() {
            if current.is_valid() && before.as_deref() != Some(current.access_token.as_str()) {
                return true;
            }
        }

        let Ok(Some(client_id)) = self.session.client_id() else {
            return false;
        };
        let refresh_token = match self.session.token() {
            Ok(Some(token)) => match token.refresh_token {
                Some(refresh) => refresh,
                None => return false,
            },
            _ => return false,
        };

        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "token refresh request failed");
                return false;
            }
        };
        if !resp.status().is_success() {
            warn!(status = resp.status().as_u16(), "token refresh rejected");
            return false;
        }

        let payload: TokenResponse = match resp.json().await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "token refresh returned invalid payload");
                return false;
            }
        };
        if self
            .session
            .save_token(&token_from_response(payload))
            .is_err()
        {
            return false;
        }
        debug!("access token refreshed");
        true
    }

    /// Produce a currently valid bearer token.
    ///
    /// Tries the persisted session, then a refresh. With `interactive` set,
    /// a failed refresh starts login and reports [`TokenAccess::Redirecting`];
    /// otherwise the call fails with [`AuthError::SessionExpired`].
    pub async fn get_access_token(&self, interactive: bool) -> Result<TokenAccess, AuthError> {
        if let Ok(Some(token)) = self.session.token() {
            if token.is_valid() {
                return Ok(TokenAccess::Bearer(token.access_token));
            }
        }

        if self.refresh_access_token().await {
            if let Ok(Some(token)) = self.session.token() {
                if token.is_valid() {
                    return Ok(TokenAccess::Bearer(token.access_token));
                }
            }
        }

        if interactive {
            let redirect = self.start_login()?;
            return Ok(TokenAccess::Redirecting(redirect));
        }
        Err(AuthError::SessionExpired)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

fn token_from_response(payload: TokenResponse) -> Token {
    let lifetime = payload.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Token {
        access_token: payload.access_token,
        expires_at: Utc::now() + Duration::seconds(lifetime),
        refresh_token: payload.refresh_token,
    }
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
