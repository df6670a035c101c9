// file: src/parser/normalizer.rs
// description: line-level cleanup of model-emitted markup noise
// reference: plain-text output contract of the recommendation prompt

pub struct LineNormalizer;

impl LineNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Strip emphasis markers, stray markdown characters, and wrapping quotes
    /// from a single line. Pure, total, and idempotent.
    pub fn normalize(&self, line: &str) -> String {
        let stripped: String = line
            .chars()
            .filter(|c| !matches!(c, '*' | '_' | '~' | '`'))
            .collect();

        let mut current = stripped.trim().to_string();

        // Unwrap quote pairs to a fixed point so repeated normalization is a
        // no-op even for doubly quoted input.
        loop {
            let unwrapped = strip_wrapping_quotes(&current).trim().to_string();
            if unwrapped == current {
                return current;
            }
            current = unwrapped;
        }
    }
}

impl Default for LineNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_wrapping_quotes(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if is_quote(first) && is_quote(last) => chars.as_str(),
        _ => s,
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}')
}
