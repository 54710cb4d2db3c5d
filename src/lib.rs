//! discolog — client-side logic for a music-album cataloguing and rating app.
//!
//! Covers the four concerns the app needs: an OAuth 2.0 PKCE session with the
//! streaming service ([`auth`]), authenticated API access with a single
//! refresh-and-retry ([`client`]), a locally persisted album list with star
//! ratings ([`catalog`]), and paginated release search against the music
//! metadata service ([`metadata`]). Persistence and navigation are traits the
//! host application implements.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use discolog::prelude::*;
//!
//! # fn navigator() -> Arc<dyn discolog::navigate::Navigator> { unimplemented!() }
//! # async fn example() -> discolog::error::Result<()> {
//! let store = Arc::new(FileKeyValueStore::new_default());
//! let auth = Arc::new(AuthManager::new(store.clone(), navigator()));
//!
//! if auth.bootstrap_auth().await? {
//!     let api = ApiClient::new(auth);
//!     let results = api.search("aquemini", &[SearchKind::Album], 20, 0).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod client;
pub mod error;
pub mod metadata;
pub mod navigate;
pub mod prelude;
pub mod store;
