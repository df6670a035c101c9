// file: src/models/book.rs
// description: parsed book recommendation entry
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// One recommendation extracted from the stream. Rebuilt from scratch on
/// every snapshot parse; carries no identity across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    /// Extracted title; may be empty for a header line with no usable content.
    pub title: String,
    /// Extracted author; empty when the header carried no " by " separator.
    pub author: String,
    /// Normalized full header line, kept verbatim for display.
    pub header_text: String,
    /// Non-blurb supplementary lines (ratings, rationale), in source order.
    pub details: Vec<String>,
    /// Blurb paragraphs joined by blank lines; empty until a blurb appears.
    pub blurb: String,
}

impl BookEntry {
    pub fn has_blurb(&self) -> bool {
        !self.blurb.is_empty()
    }

    /// Display label falling back to the raw header when no title parsed.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.header_text
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookEntry {
        BookEntry {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            header_text: "1. Dune by Frank Herbert".to_string(),
            details: vec!["Goodreads: 4.3/5".to_string()],
            blurb: String::new(),
        }
    }

    #[test]
    fn test_display_title_prefers_title() {
        assert_eq!(sample().display_title(), "Dune");
    }

    #[test]
    fn test_display_title_falls_back_to_header() {
        let mut entry = sample();
        entry.title.clear();
        assert_eq!(entry.display_title(), "1. Dune by Frank Herbert");
    }

    #[test]
    fn test_serde_round_trip() {
        let entry = sample();
        let json = serde_json::to_string(&entry).unwrap();
        let back: BookEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
