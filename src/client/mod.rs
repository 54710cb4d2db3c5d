//! Authenticated client for the streaming-service REST API.
//!
//! Every request goes through [`ApiClient::fetch_json`], which injects the
//! bearer token and performs exactly one refresh-and-retry on a 401. There is
//! no retry policy beyond that.

pub mod models;

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{AuthManager, TokenAccess};
use crate::error::{Error, Result};

pub use models::{Album, AlbumSummary, ArtistRef, Image, Page, SearchResults, Track, TrackSummary};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// What to search for. Joined comma-separated into the `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Album,
    Track,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Track => "track",
        }
    }
}

/// Streaming-API client wrapping an [`AuthManager`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use discolog::client::{ApiClient, SearchKind};
/// # async fn example(auth: Arc<discolog::auth::AuthManager>) -> discolog::error::Result<()> {
/// let api = ApiClient::new(auth);
/// let results = api.search("aquemini", &[SearchKind::Album], 20, 0).await?;
/// if let Some(albums) = results.albums {
///     println!("{} albums", albums.items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    client: reqwest::Client,
    auth: Arc<AuthManager>,
    api_url: String,
}

impl ApiClient {
    pub fn new(auth: Arc<AuthManager>) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            api_url: SPOTIFY_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// GET `path` with the given query parameters, authorized, parsed as JSON.
    ///
    /// Empty parameter values are dropped from the URL. On 401 the token is
    /// refreshed once and the request retried once; a second 401 or a failed
    /// refresh surfaces as [`Error::SessionExpired`].
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.build_url(path, params)?;
        let token = self.bearer_token().await?;
        let resp = self.get(url.clone(), &token).await?;

        let resp = if resp.status() == StatusCode::UNAUTHORIZED {
            debug!(%url, "401 from API, refreshing token and retrying once");
            if !self.auth.refresh_access_token().await {
                return Err(Error::SessionExpired);
            }
            let token = self.bearer_token().await?;
            let retried = self.get(url, &token).await?;
            if retried.status() == StatusCode::UNAUTHORIZED {
                warn!("API still unauthorized after refresh");
                return Err(Error::SessionExpired);
            }
            retried
        } else {
            resp
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body));
        }
        Ok(resp.json().await?)
    }

    /// Search the catalogue. `kinds` selects the result envelopes to fill.
    pub async fn search(
        &self,
        query: &str,
        kinds: &[SearchKind],
        limit: u32,
        offset: u32,
    ) -> Result<SearchResults> {
        let kind_list = kinds
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        self.fetch_json(
            "/search",
            &[
                ("q", query),
                ("type", kind_list.as_str()),
                ("limit", limit.to_string().as_str()),
                ("offset", offset.to_string().as_str()),
            ],
        )
        .await
    }

    pub async fn album(&self, id: &str) -> Result<Album> {
        self.fetch_json(&format!("/albums/{}", percent_encode(id)), &[])
            .await
    }

    pub async fn track(&self, id: &str) -> Result<Track> {
        self.fetch_json(&format!("/tracks/{}", percent_encode(id)), &[])
            .await
    }

    async fn bearer_token(&self) -> Result<String> {
        // Non-interactive: an API call must never navigate the page away.
        match self.auth.get_access_token(false).await? {
            TokenAccess::Bearer(token) => Ok(token),
            TokenAccess::Redirecting(_) => Err(Error::SessionExpired),
        }
    }

    async fn get(&self, url: Url, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?)
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.api_url))
            .map_err(|err| Error::InvalidArgument(format!("bad API path {path}: {err}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if !value.is_empty() {
                    pairs.append_pair(key, value);
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

/// Percent-encode a path segment (unreserved characters pass through).
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}
