//! Suffix matching over dot-separated hostname labels.
//!
//! ## Example
//!
//! ```
//! use suffix_engine_r::matcher::{strip_subdomains, strip_suffix};
//! use suffix_engine_r::SuffixSet;
//!
//! let set: SuffixSet = ["com", "co.uk"].into_iter().collect();
//!
//! assert_eq!(strip_subdomains("maps.kagi.com", &set), "kagi.com");
//! assert_eq!(strip_suffix("maps.kagi.com", &set), "maps.kagi");
//! assert_eq!(strip_subdomains("www.bbc.co.uk", &set), "bbc.co.uk");
//! ```

use crate::types::SuffixSet;

/// Order in which candidate suffixes are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Most specific candidate first; finds the longest matching suffix
    #[default]
    LongestFirst,
    /// Rightmost label first; finds the shortest matching suffix.
    /// Only equivalent to `LongestFirst` when no suffix in the set is a
    /// proper suffix of another entry.
    ShortestFirst,
}

/// A hostname split at its matched suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMatch {
    hostname: String,
    /// Index of the first suffix label
    index: usize,
    /// Byte offset where the suffix starts
    suffix_start: usize,
    /// Byte offset where the registrable domain starts
    domain_start: usize,
}

impl SuffixMatch {
    /// Lowercased hostname the match was made against
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Index of the first label belonging to the suffix
    pub fn index(&self) -> usize {
        self.index
    }

    /// The matched suffix, e.g. `co.uk`
    pub fn suffix(&self) -> &str {
        &self.hostname[self.suffix_start..]
    }

    /// Everything left of the suffix; empty if the whole hostname is a suffix
    pub fn prefix(&self) -> &str {
        if self.suffix_start == 0 {
            ""
        } else {
            &self.hostname[..self.suffix_start - 1]
        }
    }

    /// Suffix plus the label immediately to its left.
    /// The whole hostname if it is itself a suffix.
    pub fn registrable_domain(&self) -> &str {
        &self.hostname[self.domain_start..]
    }
}

/// Find the suffix of `hostname` present in `set`.
///
/// The hostname is lowercased and split on `.`; no other validation is done.
pub fn find_suffix(hostname: &str, set: &SuffixSet, order: ScanOrder) -> Option<SuffixMatch> {
    let hostname = hostname.to_lowercase();

    // Byte offset of every label
    let mut starts = vec![0];
    starts.extend(hostname.match_indices('.').map(|(pos, _)| pos + 1));

    let is_member = |&i: &usize| set.contains(&hostname[starts[i]..]);
    let index = match order {
        ScanOrder::LongestFirst => (0..starts.len()).find(is_member),
        ScanOrder::ShortestFirst => (0..starts.len()).rev().find(is_member),
    }?;

    let suffix_start = starts[index];
    let domain_start = if index == 0 { 0 } else { starts[index - 1] };

    Some(SuffixMatch {
        hostname,
        index,
        suffix_start,
        domain_start,
    })
}

/// Registrable domain of `hostname`, or the lowercased hostname if no suffix matches.
pub fn strip_subdomains(hostname: &str, set: &SuffixSet) -> String {
    strip_subdomains_with(hostname, set, ScanOrder::default())
}

/// Part of `hostname` left of its suffix, or the lowercased hostname if no suffix matches.
pub fn strip_suffix(hostname: &str, set: &SuffixSet) -> String {
    strip_suffix_with(hostname, set, ScanOrder::default())
}

pub fn strip_subdomains_with(hostname: &str, set: &SuffixSet, order: ScanOrder) -> String {
    match find_suffix(hostname, set, order) {
        Some(m) => m.registrable_domain().to_string(),
        None => hostname.to_lowercase(),
    }
}

pub fn strip_suffix_with(hostname: &str, set: &SuffixSet, order: ScanOrder) -> String {
    match find_suffix(hostname, set, order) {
        Some(m) => m.prefix().to_string(),
        None => hostname.to_lowercase(),
    }
}
