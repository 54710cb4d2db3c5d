//! Convenience re-exports for typical use.

pub use crate::auth::{AuthError, AuthManager, SessionState, Token, TokenAccess};
pub use crate::catalog::{stars_display, Album, Catalog, ReleaseKind};
pub use crate::client::{ApiClient, SearchKind, SearchResults};
pub use crate::error::{Error, Result};
pub use crate::metadata::{release_to_album, MetadataClient, Release};
pub use crate::navigate::Navigator;
pub use crate::store::{FileKeyValueStore, FileStoreConfig, KeyValueStore, StoreError};
