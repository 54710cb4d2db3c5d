//! OAuth PKCE session management for the streaming-service API.
//!
//! The lifecycle is owned by [`AuthManager`]: interactive login via
//! authorization-code + PKCE redirect, code exchange on return, transparent
//! refresh near expiry, and a validity check against the persisted session.

pub mod error;
pub mod manager;
pub mod pkce;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use manager::{AuthManager, LoginRedirect, TokenAccess};
pub use session::{SessionState, SessionStore};
pub use token::Token;
