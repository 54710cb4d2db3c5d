//! Browser-navigation boundary.
//!
//! The host application (a webview shell, a desktop wrapper, a test) owns the
//! actual location bar; the library only needs to read the current URL,
//! rewrite it in place after consuming OAuth redirect parameters, and kick
//! off a full-page redirect for interactive login.

use reqwest::Url;

/// Navigation capability implemented by the host application.
pub trait Navigator: Send + Sync {
    /// The URL currently shown to the user, including query parameters.
    fn current_url(&self) -> Url;

    /// Replace the visible URL without triggering a reload.
    fn replace_url(&self, url: &Url);

    /// Navigate away to `url`. The current page state is abandoned.
    fn redirect(&self, url: &str);
}

/// Strip a set of query parameters from `url`, preserving the rest.
pub(crate) fn without_query_params(url: &Url, names: &[&str]) -> Url {
    let mut cleaned = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !names.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    cleaned.set_query(None);
    if !kept.is_empty() {
        let mut pairs = cleaned.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
    }
    cleaned
}

/// The redirect URI for the current page: origin plus path, no query.
pub(crate) fn page_redirect_uri(url: &Url) -> String {
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.to_string()
}
