//! IANA root zone database parser.

use log::warn;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::types::SuffixSet;

/// Anchors tagged as TLD entries in the root zone listing
static TLD_ANCHOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.domain.tld a").expect("TLD_ANCHOR: hardcoded selector is invalid")
});

/// Left-to-right and right-to-left marks wrapping right-to-left TLD labels
const BIDI_MARKS: [char; 2] = ['\u{200e}', '\u{200f}'];

/// Parse the IANA root zone HTML page into a set of bare TLDs.
///
/// Each TLD anchor yields one token: its text with the leading `.` removed.
pub fn parse_tld_html(body: &[u8]) -> SuffixSet {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut set = SuffixSet::new();
    for anchor in document.select(&TLD_ANCHOR) {
        let text: String = anchor.text().collect();
        if let Some(tld) = bare_tld(&text) {
            set.insert(tld);
        }
    }

    if set.is_empty() {
        warn!("Root zone page yielded no TLD entries");
    }
    set
}

/// Strip whitespace, bidi marks and one leading punctuation character.
fn bare_tld(text: &str) -> Option<&str> {
    let text = text.trim().trim_matches(&BIDI_MARKS[..]).trim();
    let mut chars = text.chars();
    let tld = match chars.next() {
        Some(c) if c.is_ascii_punctuation() => chars.as_str(),
        Some(_) => text,
        None => return None,
    };
    if tld.is_empty() {
        None
    } else {
        Some(tld)
    }
}
