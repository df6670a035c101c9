// file: src/extractor/patterns.rs
// description: compiled regex patterns for recommendation-line classification
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Entry headers: "1. Dune by Frank Herbert"
    pub static ref HEADER_LINE: Regex = Regex::new(
        r"^(\d+)\.\s*(.*)$"
    ).expect("HEADER_LINE regex is valid");

    // Title/author split on the first " by "
    pub static ref TITLE_AUTHOR: Regex = Regex::new(
        r"(?i)^(.+?)\s+by\s+(.+)$"
    ).expect("TITLE_AUTHOR regex is valid");

    // Blurb section marker: "Blurb: ..." with an optional leading bullet
    pub static ref BLURB_MARKER: Regex = Regex::new(
        r"(?i)^(?:[-–—•]\s*)?blurb\b\s*:?\s*(.*)$"
    ).expect("BLURB_MARKER regex is valid");

    // A single leading bullet or dash marker
    pub static ref BULLET_PREFIX: Regex = Regex::new(
        r"^[-–—•]\s*"
    ).expect("BULLET_PREFIX regex is valid");

    // Rating detail lines: "- Goodreads: 4.3/5..." / "Amazon: 4.6/5..."
    pub static ref RATING_DETAIL: Regex = Regex::new(
        r"(?i)^(?:[-–—•]\s*)?(?:goodreads|amazon)\s*:"
    ).expect("RATING_DETAIL regex is valid");

    // Keywords that disqualify a long line from blurb promotion
    pub static ref RATING_KEYWORD: Regex = Regex::new(
        r"(?i)goodreads|amazon|rating"
    ).expect("RATING_KEYWORD regex is valid");

    // Rating values: "Goodreads: 4.30/5★" / "Amazon: 4.6/5 stars"
    pub static ref GOODREADS_RATING: Regex = Regex::new(
        r"(?i)goodreads\s*:\s*([0-9][0-9.]*)\s*/\s*5(?:\s*(?:★|stars?))?"
    ).expect("GOODREADS_RATING regex is valid");

    pub static ref AMAZON_RATING: Regex = Regex::new(
        r"(?i)amazon\s*:\s*([0-9][0-9.]*)\s*/\s*5(?:\s*(?:★|stars?))?"
    ).expect("AMAZON_RATING regex is valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_pattern() {
        assert!(HEADER_LINE.is_match("1. Dune by Frank Herbert"));
        assert!(HEADER_LINE.is_match("12.No space after the period"));
        assert!(HEADER_LINE.is_match("3."));
        assert!(!HEADER_LINE.is_match("Dune by Frank Herbert"));
        assert!(!HEADER_LINE.is_match("- Goodreads: 4.3/5"));
    }

    #[test]
    fn test_title_author_splits_on_first_by() {
        let caps = TITLE_AUTHOR.captures("Gone by Midnight by Candice Fox").unwrap();
        assert_eq!(&caps[1], "Gone");
        assert_eq!(&caps[2], "Midnight by Candice Fox");
    }

    #[test]
    fn test_blurb_marker_requires_word_boundary() {
        assert!(BLURB_MARKER.is_match("Blurb: a classic tale"));
        assert!(BLURB_MARKER.is_match("- blurb"));
        assert!(!BLURB_MARKER.is_match("Blurbington Chronicles"));
    }

    #[test]
    fn test_rating_detail_pattern() {
        assert!(RATING_DETAIL.is_match("Goodreads: 4.3/5 stars"));
        assert!(RATING_DETAIL.is_match("- Amazon: 4.6/5"));
        assert!(!RATING_DETAIL.is_match("A story about goodreads users"));
    }

    #[test]
    fn test_rating_value_capture() {
        let caps = GOODREADS_RATING
            .captures("Goodreads: 4.30/5★ | Amazon: 4.60/5★")
            .unwrap();
        assert_eq!(&caps[1], "4.30");

        let caps = AMAZON_RATING.captures("amazon: 4.6 / 5 stars").unwrap();
        assert_eq!(&caps[1], "4.6");
    }
}
