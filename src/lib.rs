//! Suffix Engine - registrable-domain extraction for Rust
//!
//! This library reduces hostnames to their registrable domain using:
//! - The IANA root zone database (top-level domains only)
//! - The Mozilla public suffix list (multi-label suffixes such as `co.uk`)
//! - HTTP fetching with exponential-backoff retry
//! - A lazily loaded, thread-safe suffix cache
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use suffix_engine_r::{DomainNormalizer, MemorySuffixLoader, NormalizerOptions};
//!
//! let loader = MemorySuffixLoader::new().with_suffixes(["com", "co.uk"]);
//! let normalizer = DomainNormalizer::with_loader(Arc::new(loader), NormalizerOptions::default());
//!
//! assert_eq!(normalizer.strip_subdomains("maps.kagi.com", false).unwrap(), "kagi.com");
//! assert_eq!(normalizer.strip_suffix("maps.kagi.com", false).unwrap(), "maps.kagi");
//! assert_eq!(normalizer.strip_subdomains("www.bbc.co.uk", false).unwrap(), "bbc.co.uk");
//! ```
//!
//! # Suffix Sets
//!
//! | `tld_only` | Source | Example suffixes |
//! |------------|--------|------------------|
//! | `true` | IANA root zone page | `com`, `uk` |
//! | `false` | Public suffix list | `com`, `uk`, `co.uk`, `github.io` |
//!
//! The process-wide functions ([`strip_subdomains`], [`strip_suffix`],
//! [`update_tlds`], [`update_suffixes`]) share one normalizer that fetches
//! from the upstream URLs on first use.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod matcher;
pub mod normalizer;
pub mod types;

use once_cell::sync::Lazy;

// Re-export commonly used items
pub use cache::SuffixCache;
pub use error::{FetchErrorKind, Result, SuffixError};
pub use fetch::{Fetcher, HttpClient, HttpResponse, Sleeper, ThreadSleeper, UreqClient};
pub use loader::{
    parse_suffix_list, parse_tld_html, MemorySuffixLoader, NilSuffixLoader, PslSections,
    RemoteSuffixLoader, SuffixLoader, IANA_ROOT_ZONE_URL, PUBLIC_SUFFIX_LIST_URL,
};
pub use matcher::{find_suffix, ScanOrder, SuffixMatch};
pub use normalizer::{DomainNormalizer, NormalizerOptions};
pub use types::{
    RetryPolicy, SuffixKind, SuffixSet, DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_BACKOFF,
    DEFAULT_MAX_RETRIES,
};

static GLOBAL: Lazy<DomainNormalizer> = Lazy::new(DomainNormalizer::new);

/// Process-wide normalizer backed by the upstream databases.
pub fn global() -> &'static DomainNormalizer {
    &GLOBAL
}

/// Refresh the process-wide TLD set.
pub fn update_tlds(policy: &RetryPolicy) -> Result<usize> {
    GLOBAL.update_tlds(policy)
}

/// Refresh the process-wide public suffix set.
pub fn update_suffixes(policy: &RetryPolicy) -> Result<usize> {
    GLOBAL.update_suffixes(policy)
}

/// [`DomainNormalizer::strip_subdomains`] on the process-wide normalizer.
pub fn strip_subdomains(hostname: &str, tld_only: bool) -> Result<String> {
    GLOBAL.strip_subdomains(hostname, tld_only)
}

/// [`DomainNormalizer::strip_suffix`] on the process-wide normalizer.
pub fn strip_suffix(hostname: &str, tld_only: bool) -> Result<String> {
    GLOBAL.strip_suffix(hostname, tld_only)
}
