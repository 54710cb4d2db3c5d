//! Response shapes for the metadata-service release search.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSearchResults {
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// One published edition of a musical work.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "release-group")]
    pub release_group: Option<ReleaseGroup>,
    #[serde(default, rename = "artist-credit")]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default, rename = "cover-art-archive")]
    pub cover_art_archive: Option<CoverArtArchive>,
}

/// The logical work a release belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseGroup {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "primary-type")]
    pub primary_type: Option<String>,
    #[serde(default, rename = "secondary-types")]
    pub secondary_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistCredit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<CreditedArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditedArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverArtArchive {
    #[serde(default)]
    pub front: bool,
}
