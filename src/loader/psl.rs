//! Public suffix list parser.
//!
//! The list is line oriented: `//` comments, blank separator lines, and one
//! rule per line. Only the first whitespace-delimited token of a line is
//! read.

use log::warn;

use crate::error::{Result, SuffixError};
use crate::types::SuffixSet;

const BEGIN_PRIVATE_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";
const END_PRIVATE_MARKER: &str = "===END PRIVATE DOMAINS===";

/// Which sections of the list to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PslSections {
    /// ICANN and privately registered suffixes
    #[default]
    All,
    /// ICANN suffixes only
    IcannOnly,
}

/// Parse the full public suffix list.
pub fn parse_suffix_list(body: &[u8]) -> Result<SuffixSet> {
    parse_suffix_list_sections(body, PslSections::All)
}

/// Parse the public suffix list, keeping only the requested sections.
pub fn parse_suffix_list_sections(body: &[u8], sections: PslSections) -> Result<SuffixSet> {
    let text = std::str::from_utf8(body).map_err(|e| {
        SuffixError::ParseError(format!("public suffix list is not valid UTF-8: {}", e))
    })?;

    let mut set = SuffixSet::new();
    let mut in_private = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            if line.contains(BEGIN_PRIVATE_MARKER) {
                in_private = true;
            } else if line.contains(END_PRIVATE_MARKER) {
                in_private = false;
            }
            continue;
        }

        if in_private && sections == PslSections::IcannOnly {
            continue;
        }

        if let Some(suffix) = rule_suffix(line) {
            set.insert(suffix);
        }
    }

    if set.is_empty() {
        warn!("Public suffix list yielded no entries");
    }
    Ok(set)
}

/// Suffix named by a single rule line, if any.
fn rule_suffix(line: &str) -> Option<&str> {
    let rule = line.split_whitespace().next()?;

    // Exception rules name registrable domains, not suffixes
    if rule.starts_with('!') {
        return None;
    }

    let suffix = match rule.strip_prefix('*') {
        Some(rest) => rest.strip_prefix('.').unwrap_or(rest),
        None => rule,
    };

    if suffix.is_empty() {
        None
    } else {
        Some(suffix)
    }
}
