//! Domain normalizer.
//!
//! Composes a [`SuffixLoader`], a [`SuffixCache`] and the matcher. The
//! suffix set selected by `tld_only` is loaded on first use and reused until
//! explicitly refreshed.

use std::sync::Arc;

use log::debug;

use crate::cache::SuffixCache;
use crate::error::Result;
use crate::loader::{RemoteSuffixLoader, SuffixLoader};
use crate::matcher::{find_suffix, ScanOrder, SuffixMatch};
use crate::types::{RetryPolicy, SuffixKind, SuffixSet};

/// Normalizer options.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizerOptions {
    /// Retry policy for loads triggered by matching calls
    pub retry_policy: RetryPolicy,
    /// Candidate order used by the matcher
    pub scan_order: ScanOrder,
}

impl NormalizerOptions {
    /// Create new normalizer options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry policy for lazy loads.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the scan order.
    pub fn with_scan_order(mut self, order: ScanOrder) -> Self {
        self.scan_order = order;
        self
    }
}

/// Extracts registrable domains from hostnames.
pub struct DomainNormalizer {
    loader: Arc<dyn SuffixLoader>,
    cache: SuffixCache,
    options: NormalizerOptions,
}

impl DomainNormalizer {
    /// Create a normalizer that fetches the upstream databases on demand.
    pub fn new() -> Self {
        Self::with_loader(Arc::new(RemoteSuffixLoader::new()), NormalizerOptions::default())
    }

    /// Create a normalizer with a custom loader.
    pub fn with_loader(loader: Arc<dyn SuffixLoader>, options: NormalizerOptions) -> Self {
        Self {
            loader,
            cache: SuffixCache::new(),
            options,
        }
    }

    /// Seed the cache so matching for `kind` never triggers a load.
    pub fn preload(&self, kind: SuffixKind, set: SuffixSet) {
        self.cache.replace(kind, set);
    }

    pub fn options(&self) -> &NormalizerOptions {
        &self.options
    }

    pub fn cache(&self) -> &SuffixCache {
        &self.cache
    }

    pub fn is_loaded(&self, kind: SuffixKind) -> bool {
        self.cache.is_loaded(kind)
    }

    /// Fetch the TLD set and replace the cached one. Returns the entry count.
    pub fn update_tlds(&self, policy: &RetryPolicy) -> Result<usize> {
        Ok(self.cache.refresh(SuffixKind::Tld, self.loader.as_ref(), policy)?.len())
    }

    /// Fetch the public suffix set and replace the cached one. Returns the entry count.
    pub fn update_suffixes(&self, policy: &RetryPolicy) -> Result<usize> {
        Ok(self
            .cache
            .refresh(SuffixKind::PublicSuffix, self.loader.as_ref(), policy)?
            .len())
    }

    fn suffix_set(&self, tld_only: bool) -> Result<Arc<SuffixSet>> {
        let kind = SuffixKind::from_tld_only(tld_only);
        self.cache
            .get_or_load(kind, self.loader.as_ref(), &self.options.retry_policy)
    }

    /// Split `hostname` at its matched suffix. `None` if no suffix is known.
    pub fn split(&self, hostname: &str, tld_only: bool) -> Result<Option<SuffixMatch>> {
        let set = self.suffix_set(tld_only)?;
        let found = find_suffix(hostname, &set, self.options.scan_order);
        if found.is_none() {
            debug!("No known suffix for {}", hostname);
        }
        Ok(found)
    }

    /// Registrable domain of `hostname`: the suffix plus one label.
    ///
    /// Returns the lowercased hostname unchanged if no suffix matches. Fails
    /// only if the suffix set had to be loaded and the load failed.
    pub fn strip_subdomains(&self, hostname: &str, tld_only: bool) -> Result<String> {
        Ok(match self.split(hostname, tld_only)? {
            Some(m) => m.registrable_domain().to_string(),
            None => hostname.to_lowercase(),
        })
    }

    /// Everything left of the suffix of `hostname`.
    ///
    /// Returns an empty string if the hostname is itself a suffix, and the
    /// lowercased hostname if no suffix matches.
    pub fn strip_suffix(&self, hostname: &str, tld_only: bool) -> Result<String> {
        Ok(match self.split(hostname, tld_only)? {
            Some(m) => m.prefix().to_string(),
            None => hostname.to_lowercase(),
        })
    }
}

impl Default for DomainNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
