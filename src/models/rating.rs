// file: src/models/rating.rs
// description: derived rating projection with external search links
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
    Goodreads,
    Amazon,
}

impl RatingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingSource::Goodreads => "goodreads",
            RatingSource::Amazon => "amazon",
        }
    }
}

/// A single rating mention plus a search link for its source site. Computed
/// on demand from an entry's details; never stored on the entry itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub source: RatingSource,
    pub value: String,
    pub search_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amazon: Option<Rating>,
}

impl RatingLinks {
    pub fn is_empty(&self) -> bool {
        self.goodreads.is_none() && self.amazon.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        let json = serde_json::to_string(&RatingSource::Goodreads).unwrap();
        assert_eq!(json, "\"goodreads\"");
    }

    #[test]
    fn test_links_skip_missing_sources() {
        let links = RatingLinks {
            goodreads: Some(Rating {
                source: RatingSource::Goodreads,
                value: "4.3".to_string(),
                search_url: "https://www.goodreads.com/search?q=Dune".to_string(),
            }),
            amazon: None,
        };
        let json = serde_json::to_string(&links).unwrap();
        assert!(json.contains("goodreads"));
        assert!(!json.contains("amazon"));
    }
}
