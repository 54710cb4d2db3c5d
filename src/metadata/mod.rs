//! Release search against the music metadata service.
//!
//! The search endpoint pages at 100 results; aggregation walks at most three
//! pages, stops early on a short or empty page or a non-success status, and
//! pauses briefly between pages to stay inside the service's rate etiquette.

pub mod models;

use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::{Album, ReleaseKind};
use crate::error::Result;

pub use models::{
    ArtistCredit, CoverArtArchive, CreditedArtist, Release, ReleaseGroup, ReleaseSearchResults,
};

const MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";
const COVERART_URL: &str = "https://coverartarchive.org";
const FALLBACK_COVER: &str = "images/album-placeholder.jpg";

const PAGE_SIZE: u32 = 100;
const MAX_PAGES: u32 = 3;
const PAGE_PAUSE: Duration = Duration::from_millis(250);

/// Unauthenticated client for the metadata service.
///
/// # Example
/// ```no_run
/// use discolog::metadata::{release_to_album, MetadataClient};
/// # async fn example() -> discolog::error::Result<()> {
/// let metadata = MetadataClient::new();
/// let releases = metadata.search_releases("aquemini").await?;
/// let albums: Vec<_> = releases.iter().map(release_to_album).collect();
/// # Ok(())
/// # }
/// ```
pub struct MetadataClient {
    client: reqwest::Client,
    base_url: String,
    page_pause: Duration,
}

impl Default for MetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: MUSICBRAINZ_URL.to_string(),
            page_pause: PAGE_PAUSE,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    /// Search releases, aggregating up to three pages of 100.
    ///
    /// An empty or whitespace-only query issues no request and returns an
    /// empty list.
    pub async fn search_releases(&self, query: &str) -> Result<Vec<Release>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::new();
        for page in 0..MAX_PAGES {
            let offset = page * PAGE_SIZE;
            let resp = self
                .client
                .get(format!("{}/release", self.base_url))
                .query(&[
                    ("query", query),
                    ("fmt", "json"),
                    ("limit", PAGE_SIZE.to_string().as_str()),
                    ("offset", offset.to_string().as_str()),
                ])
                .send()
                .await?;

            if !resp.status().is_success() {
                warn!(status = resp.status().as_u16(), page, "release search page failed, stopping");
                break;
            }

            let results: ReleaseSearchResults = resp.json().await?;
            let count = results.releases.len();
            if count == 0 {
                break;
            }
            all.extend(results.releases);
            debug!(page, count, total = all.len(), "release search page fetched");

            if count < PAGE_SIZE as usize {
                break;
            }
            tokio::time::sleep(self.page_pause).await;
        }
        Ok(all)
    }
}

/// Classify a release by its release-group: primary type "Single" (or a
/// secondary type "Single") means single, everything else album.
pub fn release_kind(release_group: Option<&ReleaseGroup>) -> ReleaseKind {
    let Some(group) = release_group else {
        return ReleaseKind::Album;
    };
    let primary_is_single = group
        .primary_type
        .as_deref()
        .is_some_and(|kind| kind.eq_ignore_ascii_case("single"));
    let secondary_is_single = group
        .secondary_types
        .iter()
        .any(|kind| kind.eq_ignore_ascii_case("single"));
    if primary_is_single || secondary_is_single {
        ReleaseKind::Single
    } else {
        ReleaseKind::Album
    }
}

/// Join the artist-credit entries into one display name.
pub fn format_artist_credit(credit: &[ArtistCredit]) -> String {
    let joined: String = credit
        .iter()
        .map(|entry| {
            entry
                .name
                .as_deref()
                .or_else(|| entry.artist.as_ref().and_then(|a| a.name.as_deref()))
                .unwrap_or("")
        })
        .collect();
    let joined = joined.trim();
    if joined.is_empty() {
        "Unknown artist".to_string()
    } else {
        joined.to_string()
    }
}

/// Resolve a cover image URL: front cover on the release, else the
/// release-group cover, else a placeholder.
pub fn cover_url(release: &Release) -> String {
    if release
        .cover_art_archive
        .as_ref()
        .is_some_and(|archive| archive.front)
    {
        return format!("{COVERART_URL}/release/{}/front-250", release.id);
    }
    if let Some(group_id) = release
        .release_group
        .as_ref()
        .and_then(|group| group.id.as_deref())
    {
        return format!("{COVERART_URL}/release-group/{group_id}/front-250");
    }
    FALLBACK_COVER.to_string()
}

/// Convert a raw release into a catalogue album.
pub fn release_to_album(release: &Release) -> Album {
    Album {
        id: release.id.clone(),
        kind: release_kind(release.release_group.as_ref()),
        title: release.title.clone(),
        artist: format_artist_credit(&release.artist_credit),
        year: release
            .date
            .as_deref()
            .filter(|date| date.len() >= 4)
            .map(|date| date[..4].to_string()),
        cover_url: cover_url(release),
    }
}
