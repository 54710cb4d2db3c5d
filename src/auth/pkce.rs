//! PKCE challenge material for the authorization-code flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Length of the CSRF `state` parameter.
pub const STATE_LEN: usize = 20;
/// Length of the PKCE code verifier.
pub const VERIFIER_LEN: usize = 96;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Transient login-attempt secrets: created at login start, consumed on the
/// redirect return.
#[derive(Debug, Clone)]
pub struct PkceExchange {
    pub state: String,
    pub verifier: String,
}

impl PkceExchange {
    /// Generate a fresh state/verifier pair.
    pub fn generate() -> Self {
        Self {
            state: random_string(STATE_LEN),
            verifier: random_string(VERIFIER_LEN),
        }
    }

    /// The S256 code challenge: URL-safe base64 of the SHA-256 digest of the
    /// verifier, padding stripped.
    pub fn challenge(&self) -> String {
        code_challenge(&self.verifier)
    }
}

pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Random alphanumeric string of `length` chars, fed from v4 UUID bytes.
fn random_string(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    for chunk in bytes.chunks_mut(16) {
        let id = uuid::Uuid::new_v4();
        let len = chunk.len().min(16);
        chunk[..len].copy_from_slice(&id.as_bytes()[..len]);
    }
    bytes
        .iter()
        .map(|byte| CHARSET[*byte as usize % CHARSET.len()] as char)
        .collect()
}
