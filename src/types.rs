use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, SuffixError};

/// Default number of retries after the first failed fetch attempt
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default wait before the first retry
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// Default multiplier applied to the wait after each retry
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.5;

/// Which suffix database to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    /// IANA top-level domains only
    Tld,
    /// Mozilla public suffix list (includes multi-label suffixes)
    PublicSuffix,
}

impl SuffixKind {
    /// Map the `tld_only` flag to a database
    pub fn from_tld_only(tld_only: bool) -> Self {
        if tld_only {
            SuffixKind::Tld
        } else {
            SuffixKind::PublicSuffix
        }
    }
}

impl fmt::Display for SuffixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixKind::Tld => f.write_str("TLD"),
            SuffixKind::PublicSuffix => f.write_str("public suffix"),
        }
    }
}

/// Set of known domain suffixes.
///
/// Entries are stored lowercase. Empty strings and entries starting with
/// `*` or `/` are rejected on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixSet {
    entries: HashSet<String>,
}

impl SuffixSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a suffix. Returns false if the entry was rejected or already present.
    pub fn insert(&mut self, suffix: &str) -> bool {
        let suffix = suffix.trim();
        if suffix.is_empty() || suffix.starts_with('*') || suffix.starts_with('/') {
            return false;
        }
        self.entries.insert(suffix.to_lowercase())
    }

    /// Check membership. Assumes `suffix` is already lowercased.
    pub fn contains(&self, suffix: &str) -> bool {
        self.entries.contains(suffix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SuffixSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SuffixSet::new();
        for suffix in iter {
            set.insert(suffix.as_ref());
        }
        set
    }
}

/// Retry policy for fetching a suffix database.
///
/// The first attempt is not a retry: a policy with `max_retries = 5` makes
/// at most 6 requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_backoff,
            backoff_factor,
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the retry count
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the wait before the first retry
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the backoff multiplier
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Check that the backoff grows
    pub fn validate(&self) -> Result<()> {
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 1.0 {
            return Err(SuffixError::InvalidRetryPolicy(format!(
                "backoff factor must be a finite number greater than 1, got {}",
                self.backoff_factor
            )));
        }
        Ok(())
    }

    /// Waits inserted before each retry, in order.
    pub fn backoff_schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            remaining: self.max_retries,
            current: self.initial_backoff,
            factor: self.backoff_factor,
        }
    }
}

/// Iterator over the waits of a [`RetryPolicy`].
///
/// Waits saturate at [`Duration::MAX`] instead of overflowing.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    remaining: u32,
    current: Duration,
    factor: f64,
}

impl BackoffSchedule {
    /// Retries not yet handed out
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let wait = self.current;
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.factor)
            .unwrap_or(Duration::MAX);
        Some(wait)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BackoffSchedule {}
