//! Page-lifetime record of image URLs already requested.
//!
//! The cache is owned by whatever owns the page (see
//! [`PageLayout`](super::PageLayout)) and lent to the code that starts
//! fetches. It only answers "has this URL been requested yet?"; the bytes
//! themselves live in the HTTP cache, which outlives it.

use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct PreloadCache {
    requested: HashSet<String>,
}

impl PreloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as requested. Returns `true` only the first time a
    /// non-empty URL is seen; the caller starts a fetch exactly then.
    pub fn request(&mut self, url: &str) -> bool {
        if url.is_empty() || self.requested.contains(url) {
            return false;
        }
        self.requested.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.requested.contains(url)
    }

    pub fn len(&self) -> usize {
        self.requested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Forget everything, e.g. when navigating to a different page.
    pub fn clear(&mut self) {
        debug!(urls = self.requested.len(), "clearing preload cache");
        self.requested.clear();
    }
}

/// Starts the actual network fetch for a URL.
pub trait ImageFetcher {
    fn fetch(&mut self, url: &str);
}

/// Recording fetcher: collects URLs in request order.
impl ImageFetcher for Vec<String> {
    fn fetch(&mut self, url: &str) {
        self.push(url.to_string());
    }
}

/// Warm up a batch of images, skipping empty and already-requested URLs.
///
/// Returns how many fetches were started.
pub fn preload_all<'a>(
    cache: &mut PreloadCache,
    urls: impl IntoIterator<Item = &'a str>,
    fetcher: &mut dyn ImageFetcher,
) -> usize {
    let mut started = 0;
    for url in urls {
        if cache.request(url) {
            fetcher.fetch(url);
            started += 1;
        }
    }
    started
}
