// file: src/extractor/ratings.rs
// description: rating extraction from entry detail lines with search links
// reference: Goodreads/Amazon rating mention formats from the prompt contract

use crate::extractor::patterns::{AMAZON_RATING, GOODREADS_RATING};
use crate::models::{Rating, RatingLinks, RatingSource};

/// Projects an entry's detail lines into per-source ratings. First mention of
/// each source wins; later duplicates are ignored.
pub struct RatingExtractor;

impl RatingExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, details: &[String], title: &str, author: &str) -> RatingLinks {
        let mut links = RatingLinks::default();

        for line in details {
            if links.goodreads.is_none() {
                if let Some(caps) = GOODREADS_RATING.captures(line) {
                    links.goodreads = Some(Rating {
                        source: RatingSource::Goodreads,
                        value: format_rating_value(&caps[1]),
                        search_url: goodreads_search_url(title),
                    });
                }
            }

            if links.amazon.is_none() {
                if let Some(caps) = AMAZON_RATING.captures(line) {
                    links.amazon = Some(Rating {
                        source: RatingSource::Amazon,
                        value: format_rating_value(&caps[1]),
                        search_url: amazon_search_url(title, author),
                    });
                }
            }

            if links.goodreads.is_some() && links.amazon.is_some() {
                break;
            }
        }

        links
    }
}

impl Default for RatingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Reformat to one decimal place when numeric, otherwise pass through.
fn format_rating_value(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(value) => format!("{value:.1}"),
        Err(_) => raw.to_string(),
    }
}

pub fn goodreads_search_url(title: &str) -> String {
    format!(
        "https://www.goodreads.com/search?q={}",
        urlencoding::encode(title)
    )
}

pub fn amazon_search_url(title: &str, author: &str) -> String {
    let query = if author.is_empty() {
        title.to_string()
    } else {
        format!("{title} {author}")
    };
    format!("https://www.amazon.com/s?k={}", urlencoding::encode(&query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn details(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_both_sources_from_one_line() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(
            &details(&["Goodreads: 4.30/5★ | Amazon: 4.60/5★"]),
            "Dune",
            "Frank Herbert",
        );

        let goodreads = links.goodreads.unwrap();
        assert_eq!(goodreads.value, "4.3");
        assert_eq!(
            goodreads.search_url,
            "https://www.goodreads.com/search?q=Dune"
        );

        let amazon = links.amazon.unwrap();
        assert_eq!(amazon.value, "4.6");
        assert_eq!(
            amazon.search_url,
            "https://www.amazon.com/s?k=Dune%20Frank%20Herbert"
        );
    }

    #[test]
    fn test_first_mention_wins() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(
            &details(&["Goodreads: 4.1/5", "Goodreads: 3.0/5"]),
            "Dune",
            "",
        );
        assert_eq!(links.goodreads.unwrap().value, "4.1");
    }

    #[test]
    fn test_missing_source_stays_none() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(&details(&["Amazon: 4.6/5 stars"]), "Dune", "");
        assert!(links.goodreads.is_none());
        assert_eq!(links.amazon.unwrap().value, "4.6");
    }

    #[test]
    fn test_integer_value_gains_decimal() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(&details(&["Goodreads: 4/5 stars"]), "Dune", "");
        assert_eq!(links.goodreads.unwrap().value, "4.0");
    }

    #[test]
    fn test_unparseable_value_passes_through() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(&details(&["Goodreads: 4.3.1/5"]), "Dune", "");
        assert_eq!(links.goodreads.unwrap().value, "4.3.1");
    }

    #[test]
    fn test_amazon_url_without_author_uses_title_alone() {
        assert_eq!(
            amazon_search_url("Project Hail Mary", ""),
            "https://www.amazon.com/s?k=Project%20Hail%20Mary"
        );
    }

    #[test]
    fn test_url_encoding_special_characters() {
        assert_eq!(
            goodreads_search_url("Harry Potter & Me"),
            "https://www.goodreads.com/search?q=Harry%20Potter%20%26%20Me"
        );
    }

    #[test]
    fn test_no_details_yields_empty_links() {
        let extractor = RatingExtractor::new();
        let links = extractor.extract(&[], "Dune", "");
        assert!(links.is_empty());
    }
}
