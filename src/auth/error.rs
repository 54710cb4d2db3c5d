use thiserror::Error;

use crate::store::StoreError;

/// Normalized authentication errors for the token lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No client id registered")]
    MissingClientId,
    #[error("OAuth state mismatch on redirect return")]
    StateMismatch,
    #[error("No PKCE verifier available for code exchange")]
    MissingVerifier,
    #[error("Token endpoint rejected the exchange with status {status}")]
    ExchangeFailed { status: u16 },
    #[error("Session expired")]
    SessionExpired,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Storage error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}
