//! Suffix database loaders.
//!
//! A [`SuffixLoader`] produces a complete [`SuffixSet`] for one
//! [`SuffixKind`]. The remote loader fetches and parses the upstream
//! datasets; the memory loader serves pre-seeded sets.

pub mod psl;
pub mod tld;

pub use psl::{parse_suffix_list, parse_suffix_list_sections, PslSections};
pub use tld::parse_tld_html;

use std::collections::HashMap;

use log::info;

use crate::error::{Result, SuffixError};
use crate::fetch::Fetcher;
use crate::types::{RetryPolicy, SuffixKind, SuffixSet};

/// IANA root zone database listing
pub const IANA_ROOT_ZONE_URL: &str = "https://www.iana.org/domains/root/db";

/// Mozilla public suffix list
pub const PUBLIC_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

/// Trait for loading suffix databases
pub trait SuffixLoader: Send + Sync {
    /// Load the complete set for `kind`.
    fn load(&self, kind: SuffixKind, policy: &RetryPolicy) -> Result<SuffixSet>;
}

/// Loader that fetches the IANA root zone page and the public suffix list
pub struct RemoteSuffixLoader {
    fetcher: Fetcher,
    tld_url: String,
    suffix_url: String,
    sections: PslSections,
}

impl RemoteSuffixLoader {
    /// Create a loader for the default upstream URLs
    pub fn new() -> Self {
        Self {
            fetcher: Fetcher::new(),
            tld_url: IANA_ROOT_ZONE_URL.to_string(),
            suffix_url: PUBLIC_SUFFIX_LIST_URL.to_string(),
            sections: PslSections::All,
        }
    }

    /// Set the fetcher (HTTP client and sleeper)
    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Set custom root zone URL
    pub fn with_tld_url(mut self, url: impl Into<String>) -> Self {
        self.tld_url = url.into();
        self
    }

    /// Set custom public suffix list URL
    pub fn with_suffix_url(mut self, url: impl Into<String>) -> Self {
        self.suffix_url = url.into();
        self
    }

    /// Select which public suffix list sections to keep
    pub fn with_sections(mut self, sections: PslSections) -> Self {
        self.sections = sections;
        self
    }

    pub fn url(&self, kind: SuffixKind) -> &str {
        match kind {
            SuffixKind::Tld => &self.tld_url,
            SuffixKind::PublicSuffix => &self.suffix_url,
        }
    }

    /// Async variant of [`SuffixLoader::load`], fetching with [`Fetcher::fetch_async`].
    ///
    /// The result can be installed with `DomainNormalizer::preload`.
    #[cfg(feature = "async")]
    pub async fn load_async(&self, kind: SuffixKind, policy: &RetryPolicy) -> Result<SuffixSet> {
        let url = self.url(kind);
        let body = self.fetcher.fetch_async(url, policy).await?;
        self.parse(kind, url, &body)
    }

    fn parse(&self, kind: SuffixKind, url: &str, body: &[u8]) -> Result<SuffixSet> {
        let set = match kind {
            SuffixKind::Tld => parse_tld_html(body),
            SuffixKind::PublicSuffix => parse_suffix_list_sections(body, self.sections)?,
        };

        info!("Loaded {} {} entries from {}", set.len(), kind, url);
        Ok(set)
    }
}

impl Default for RemoteSuffixLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixLoader for RemoteSuffixLoader {
    fn load(&self, kind: SuffixKind, policy: &RetryPolicy) -> Result<SuffixSet> {
        let url = self.url(kind);
        let body = self.fetcher.fetch(url, policy)?;
        self.parse(kind, url, &body)
    }
}

/// Nil loader - returns errors for all loads
pub struct NilSuffixLoader;

impl SuffixLoader for NilSuffixLoader {
    fn load(&self, kind: SuffixKind, _policy: &RetryPolicy) -> Result<SuffixSet> {
        Err(SuffixError::LoaderUnavailable(kind))
    }
}

/// In-memory loader for testing and offline use
#[derive(Debug, Clone, Default)]
pub struct MemorySuffixLoader {
    sets: HashMap<SuffixKind, SuffixSet>,
}

impl MemorySuffixLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `set` for `kind`, replacing any previous set
    pub fn add(&mut self, kind: SuffixKind, set: SuffixSet) {
        self.sets.insert(kind, set);
    }

    pub fn with_tlds<S: AsRef<str>>(mut self, tlds: impl IntoIterator<Item = S>) -> Self {
        self.add(SuffixKind::Tld, tlds.into_iter().collect());
        self
    }

    pub fn with_suffixes<S: AsRef<str>>(mut self, suffixes: impl IntoIterator<Item = S>) -> Self {
        self.add(SuffixKind::PublicSuffix, suffixes.into_iter().collect());
        self
    }
}

impl SuffixLoader for MemorySuffixLoader {
    fn load(&self, kind: SuffixKind, _policy: &RetryPolicy) -> Result<SuffixSet> {
        self.sets
            .get(&kind)
            .cloned()
            .ok_or(SuffixError::LoaderUnavailable(kind))
    }
}
