//! Persisted session state behind a narrow accessor interface.
//!
//! All auth-related keys live here so every read and write of shared session
//! state funnels through one module.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::AuthError;
use super::pkce::PkceExchange;
use super::token::Token;
use crate::store::KeyValueStore;

const KEY_CLIENT_ID: &str = "client_id";
const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_EXPIRES_AT: &str = "token_expires_at";
const KEY_REFRESH_TOKEN: &str = "refresh_token";
const KEY_PKCE_VERIFIER: &str = "pkce_verifier";
const KEY_AUTH_STATE: &str = "auth_state";

/// Environment variable consulted when no client id is persisted.
pub const CLIENT_ID_ENV: &str = "DISCOLOG_CLIENT_ID";

/// Coarse session status for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token on record.
    Unauthenticated,
    /// Token present and inside its validity window.
    Authenticated,
    /// Token present but past (or inside the safety margin of) its expiry;
    /// a refresh is needed before use.
    Expiring,
}

/// Accessor over the key-value store for client registration, tokens, and
/// transient PKCE state.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The registered client id: persisted value first, then the
    /// `DISCOLOG_CLIENT_ID` environment variable (a `.env` file is honored).
    pub fn client_id(&self) -> Result<Option<String>, AuthError> {
        if let Some(id) = self.store.get(KEY_CLIENT_ID)? {
            if !id.is_empty() {
                return Ok(Some(id));
            }
        }
        let _ = dotenvy::dotenv();
        Ok(std::env::var(CLIENT_ID_ENV).ok().filter(|id| !id.is_empty()))
    }

    /// Persist a client id. Empty values are ignored.
    pub fn set_client_id(&self, client_id: &str) -> Result<(), AuthError> {
        if client_id.is_empty() {
            return Ok(());
        }
        self.store.set(KEY_CLIENT_ID, client_id)?;
        Ok(())
    }

    /// Load the persisted token, if any.
    pub fn token(&self) -> Result<Option<Token>, AuthError> {
        let Some(access_token) = self.store.get(KEY_ACCESS_TOKEN)? else {
            return Ok(None);
        };
        let expires_at = self
            .store
            .get(KEY_EXPIRES_AT)?
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let refresh_token = self.store.get(KEY_REFRESH_TOKEN)?;
        Ok(Some(Token {
            access_token,
            expires_at,
            refresh_token,
        }))
    }

    /// Persist a token. An absent refresh token leaves any previously stored
    /// refresh token in place, since token endpoints may omit it on refresh.
    pub fn save_token(&self, token: &Token) -> Result<(), AuthError> {
        self.store.set(KEY_ACCESS_TOKEN, &token.access_token)?;
        self.store
            .set(KEY_EXPIRES_AT, &token.expires_at.timestamp_millis().to_string())?;
        if let Some(refresh) = &token.refresh_token {
            self.store.set(KEY_REFRESH_TOKEN, refresh)?;
        }
        Ok(())
    }

    /// Pure validity check against the persisted session and current time.
    pub fn is_token_valid(&self) -> bool {
        matches!(self.token(), Ok(Some(token)) if token.is_valid())
    }

    pub fn session_state(&self) -> SessionState {
        match self.token() {
            Ok(Some(token)) if token.is_valid() => SessionState::Authenticated,
            Ok(Some(_)) => SessionState::Expiring,
            _ => SessionState::Unauthenticated,
        }
    }

    /// Persist the transient PKCE pair for an in-flight login attempt.
    pub fn save_pkce(&self, exchange: &PkceExchange) -> Result<(), AuthError> {
        self.store.set(KEY_AUTH_STATE, &exchange.state)?;
        self.store.set(KEY_PKCE_VERIFIER, &exchange.verifier)?;
        Ok(())
    }

    /// The `state` value persisted at login start, if any.
    pub fn pending_state(&self) -> Result<Option<String>, AuthError> {
        Ok(self.store.get(KEY_AUTH_STATE)?)
    }

    /// The PKCE verifier persisted at login start, if any.
    pub fn pkce_verifier(&self) -> Result<Option<String>, AuthError> {
        Ok(self.store.get(KEY_PKCE_VERIFIER)?)
    }

    /// Erase the transient PKCE pair. Write-once-read-once: called after a
    /// successful exchange.
    pub fn clear_pkce(&self) -> Result<(), AuthError> {
        self.store.remove(KEY_PKCE_VERIFIER)?;
        self.store.remove(KEY_AUTH_STATE)?;
        Ok(())
    }

    /// Drop the persisted session entirely.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(KEY_ACCESS_TOKEN)?;
        self.store.remove(KEY_EXPIRES_AT)?;
        self.store.remove(KEY_REFRESH_TOKEN)?;
        Ok(())
    }
}
