// file: src/parser/recommendation.rs
// description: incremental recommendation-stream parser over growing text snapshots
// reference: line-oriented state machine, one full re-parse per snapshot

use crate::config::ExtractionConfig;
use crate::extractor::patterns::{
    BLURB_MARKER, BULLET_PREFIX, HEADER_LINE, RATING_DETAIL, RATING_KEYWORD, TITLE_AUTHOR,
};
use crate::models::BookEntry;
use crate::parser::normalizer::LineNormalizer;

/// Re-derives the structured book list from the complete text accumulated so
/// far. Called once per stream increment with the full snapshot; the parse is
/// a pure function of that snapshot, so a line that is still truncated simply
/// classifies differently on the next, longer snapshot.
pub struct RecommendationParser {
    normalizer: LineNormalizer,
    blurb_promotion_min_chars: usize,
    blurb_promotion_min_details: usize,
}

/// Parser position, one open entry at most.
enum ParserState {
    /// Nothing matched yet; lines are discarded until the first header.
    SeekingHeader,
    InEntry(EntryBuilder),
}

struct EntryBuilder {
    title: String,
    author: String,
    header_text: String,
    details: Vec<String>,
    /// Accumulated blurb lines; an empty element marks a paragraph break.
    blurb_lines: Vec<String>,
    blurb_open: bool,
}

impl EntryBuilder {
    fn open(normalizer: &LineNormalizer, header: &str) -> Self {
        let rest = HEADER_LINE
            .captures(header)
            .map(|caps| caps[2].to_string())
            .unwrap_or_default();

        let (title, author) = match TITLE_AUTHOR.captures(&rest) {
            Some(caps) => (
                normalizer.normalize(&caps[1]),
                normalizer.normalize(&caps[2]),
            ),
            None => (normalizer.normalize(&rest), String::new()),
        };

        Self {
            title,
            author,
            header_text: header.to_string(),
            details: Vec::new(),
            blurb_lines: Vec::new(),
            blurb_open: false,
        }
    }

    fn open_blurb(&mut self, seed: String) {
        if !seed.is_empty() {
            self.blurb_lines.push(seed);
        }
        self.blurb_open = true;
    }

    fn push_detail(&mut self, line: &str) {
        let detail = BULLET_PREFIX.replace(line, "");
        if !detail.is_empty() {
            self.details.push(detail.into_owned());
        }
    }

    fn finish(self) -> BookEntry {
        BookEntry {
            title: self.title,
            author: self.author,
            header_text: self.header_text,
            details: self.details,
            blurb: join_paragraphs(&self.blurb_lines),
        }
    }
}

impl RecommendationParser {
    pub fn new() -> Self {
        Self::with_tuning(&ExtractionConfig::default())
    }

    pub fn with_tuning(tuning: &ExtractionConfig) -> Self {
        Self {
            normalizer: LineNormalizer::new(),
            blurb_promotion_min_chars: tuning.blurb_promotion_min_chars,
            blurb_promotion_min_details: tuning.blurb_promotion_min_details,
        }
    }

    /// Parse the full snapshot into ordered entries. Total: malformed input
    /// degrades to partial fields, never an error.
    pub fn parse(&self, full_text: &str) -> Vec<BookEntry> {
        let mut entries = Vec::new();
        let mut state = ParserState::SeekingHeader;

        for raw_line in full_text.lines() {
            let line = self.normalizer.normalize(raw_line);
            state = self.step(state, &line, &mut entries);
        }

        if let ParserState::InEntry(open) = state {
            entries.push(open.finish());
        }

        entries
    }

    fn step(&self, state: ParserState, line: &str, entries: &mut Vec<BookEntry>) -> ParserState {
        // Headers outrank every other classification and close the open entry.
        if HEADER_LINE.is_match(line) {
            if let ParserState::InEntry(open) = state {
                entries.push(open.finish());
            }
            return ParserState::InEntry(EntryBuilder::open(&self.normalizer, line));
        }

        let ParserState::InEntry(mut entry) = state else {
            // No entry open yet: the preamble before the first header.
            return ParserState::SeekingHeader;
        };

        if entry.blurb_open {
            self.blurb_line(&mut entry, line);
        } else {
            self.entry_line(&mut entry, line);
        }

        ParserState::InEntry(entry)
    }

    /// Classify a line inside an entry that has not started its blurb.
    fn entry_line(&self, entry: &mut EntryBuilder, line: &str) {
        if let Some(caps) = BLURB_MARKER.captures(line) {
            entry.open_blurb(self.normalizer.normalize(&caps[1]));
            return;
        }

        if line.is_empty() {
            return;
        }

        // A long prose line after the ratings/rationale block is almost
        // always an unmarked blurb opening.
        if line.chars().count() > self.blurb_promotion_min_chars
            && !RATING_KEYWORD.is_match(line)
            && entry.details.len() >= self.blurb_promotion_min_details
        {
            entry.open_blurb(self.strip_marker(line));
            return;
        }

        entry.push_detail(line);
    }

    /// Classify a line while the entry's blurb is open.
    fn blurb_line(&self, entry: &mut EntryBuilder, line: &str) {
        // A rating line ends the blurb and belongs to details instead.
        if RATING_DETAIL.is_match(line) {
            entry.blurb_open = false;
            entry.push_detail(line);
            return;
        }

        if line.is_empty() {
            entry.blurb_lines.push(String::new());
            return;
        }

        entry.blurb_lines.push(self.strip_marker(line));
    }

    /// Rule-b stripping: drop one leading bullet, then unwrap quotes.
    fn strip_marker(&self, line: &str) -> String {
        self.normalizer.normalize(&BULLET_PREFIX.replace(line, ""))
    }
}

impl Default for RecommendationParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Join blurb lines into paragraphs: runs of non-empty lines stay together,
/// break markers collapse into a single blank-line separator.
fn join_paragraphs(lines: &[String]) -> String {
    let mut blurb = String::new();
    let mut pending_break = false;

    for line in lines {
        if line.is_empty() {
            if !blurb.is_empty() {
                pending_break = true;
            }
            continue;
        }

        if !blurb.is_empty() {
            blurb.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        pending_break = false;
        blurb.push_str(line);
    }

    blurb
}
