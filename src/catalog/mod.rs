//! Local album catalogue and star ratings.
//!
//! The album list lives as one JSON array under a fixed store key; each
//! rating lives under its own per-album key. Both go through the same
//! [`KeyValueStore`] the auth session uses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::KeyValueStore;

const KEY_ALBUMS: &str = "albums";
const RATING_KEY_PREFIX: &str = "rating_";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Whether a catalogued item is a full album or a single.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    Album,
    Single,
}

/// One saved album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub kind: ReleaseKind,
    pub title: String,
    pub artist: String,
    pub year: Option<String>,
    pub cover_url: String,
}

/// Album list and ratings over a key-value store.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use discolog::catalog::Catalog;
/// use discolog::store::FileKeyValueStore;
///
/// let catalog = Catalog::new(Arc::new(FileKeyValueStore::new_default()));
/// for album in catalog.albums()? {
///     println!("{} — {}", album.artist, album.title);
/// }
/// # Ok::<(), discolog::error::Error>(())
/// ```
pub struct Catalog {
    store: Arc<dyn KeyValueStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved album list, oldest first.
    pub fn albums(&self) -> Result<Vec<Album>> {
        match self.store.get(KEY_ALBUMS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append albums not already present (by id). Returns how many were
    /// actually added.
    pub fn add_albums(&self, new_albums: &[Album]) -> Result<usize> {
        let mut albums = self.albums()?;
        let mut added = 0;
        for album in new_albums {
            if albums.iter().any(|existing| existing.id == album.id) {
                continue;
            }
            albums.push(album.clone());
            added += 1;
        }
        if added > 0 {
            self.store.set(KEY_ALBUMS, &serde_json::to_string(&albums)?)?;
        }
        debug!(added, total = albums.len(), "catalogue updated");
        Ok(added)
    }

    pub fn contains(&self, album_id: &str) -> Result<bool> {
        Ok(self.albums()?.iter().any(|album| album.id == album_id))
    }

    /// Record a star rating for an album. Ratings are 1 to 5.
    pub fn rate(&self, album_id: &str, stars: u8) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&stars) {
            return Err(Error::InvalidArgument(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {stars}"
            )));
        }
        self.store
            .set(&format!("{RATING_KEY_PREFIX}{album_id}"), &stars.to_string())?;
        Ok(())
    }

    /// The saved rating for an album, if any.
    pub fn rating(&self, album_id: &str) -> Result<Option<u8>> {
        Ok(self
            .store
            .get(&format!("{RATING_KEY_PREFIX}{album_id}"))?
            .and_then(|raw| raw.parse::<u8>().ok())
            .filter(|stars| (MIN_RATING..=MAX_RATING).contains(stars)))
    }

    pub fn clear_rating(&self, album_id: &str) -> Result<()> {
        self.store
            .remove(&format!("{RATING_KEY_PREFIX}{album_id}"))?;
        Ok(())
    }
}

/// Render a rating as filled and empty stars, e.g. `★★★☆☆` for 3.
pub fn stars_display(stars: u8) -> String {
    let filled = usize::from(stars.min(MAX_RATING));
    let empty = usize::from(MAX_RATING) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
