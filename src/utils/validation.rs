// file: src/utils/validation.rs
// description: input validation utilities and helpers
// reference: input validation patterns

use crate::error::{AppError, Result};
use std::collections::HashSet;

pub struct Validator;

impl Validator {
    /// Trim and validate a user-supplied book name. Tabs and newlines are
    /// permitted (titles with line breaks exist); other control characters
    /// are not.
    pub fn validate_book_name(name: &str, max_len: usize) -> Result<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Book name cannot be empty or only whitespace".to_string(),
            ));
        }

        if trimmed.chars().count() > max_len {
            return Err(AppError::Validation(format!(
                "Book name must be less than {max_len} characters"
            )));
        }

        if trimmed
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t')
        {
            return Err(AppError::Validation(
                "Book name contains invalid characters".to_string(),
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Trim, lowercase, deduplicate, and bound a tag list. Invalid tags are
    /// dropped rather than failing the whole request.
    pub fn sanitize_tags(tags: &[String], max_tags: usize, max_tag_len: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut sanitized = Vec::new();

        for tag in tags {
            let cleaned = tag.trim().to_lowercase();

            if cleaned.is_empty() || cleaned.chars().count() > max_tag_len {
                continue;
            }

            if cleaned.chars().any(|c| c.is_control()) {
                continue;
            }

            if seen.insert(cleaned.clone()) {
                sanitized.push(cleaned);
            }

            if sanitized.len() == max_tags {
                break;
            }
        }

        sanitized
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            text.chars().take(max_chars).collect()
        }
    }

    /// Shorten a name for log lines, marking the elision.
    pub fn log_preview(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            format!("{}...", Self::truncate_text(text, max_chars))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_book_name_trims() {
        assert_eq!(
            Validator::validate_book_name("  Dune  ", 200).unwrap(),
            "Dune"
        );
    }

    #[test]
    fn test_validate_book_name_rejects_empty() {
        assert!(Validator::validate_book_name("", 200).is_err());
        assert!(Validator::validate_book_name("   ", 200).is_err());
    }

    #[test]
    fn test_validate_book_name_rejects_overlong() {
        let name = "x".repeat(201);
        assert!(Validator::validate_book_name(&name, 200).is_err());
    }

    #[test]
    fn test_validate_book_name_rejects_control_chars() {
        assert!(Validator::validate_book_name("Dune\u{0007}", 200).is_err());
        // Tabs and newlines are tolerated.
        assert!(Validator::validate_book_name("Dune\tMessiah", 200).is_ok());
    }

    #[test]
    fn test_sanitize_tags_normalizes_and_dedupes() {
        let tags = vec![
            " Sci-Fi ".to_string(),
            "SCI-FI".to_string(),
            "fantasy".to_string(),
            String::new(),
        ];
        assert_eq!(
            Validator::sanitize_tags(&tags, 20, 50),
            vec!["sci-fi", "fantasy"]
        );
    }

    #[test]
    fn test_sanitize_tags_drops_invalid_entries() {
        let tags = vec!["ok".to_string(), "x".repeat(51), "bad\u{0000}tag".to_string()];
        assert_eq!(Validator::sanitize_tags(&tags, 20, 50), vec!["ok"]);
    }

    #[test]
    fn test_sanitize_tags_caps_count() {
        let tags: Vec<String> = (0..30).map(|i| format!("tag{i}")).collect();
        assert_eq!(Validator::sanitize_tags(&tags, 20, 50).len(), 20);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("1234567890ab", 10), "1234567890");
    }

    #[test]
    fn test_log_preview_marks_elision() {
        assert_eq!(Validator::log_preview("short", 10), "short");
        assert_eq!(Validator::log_preview("1234567890ab", 10), "1234567890...");
    }
}
