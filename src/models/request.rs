// file: src/models/request.rs
// description: API request/response payloads and SSE stream events
// reference: internal data structures

use crate::config::LimitsConfig;
use crate::error::Result;
use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendRequest {
    pub book_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecommendRequest {
    /// Normalize and validate the request against configured limits.
    /// Bad book names are errors; bad tags are dropped, not fatal.
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let book_name = Validator::validate_book_name(&self.book_name, limits.max_book_name_len)?;
        let tags = Validator::sanitize_tags(&self.tags, limits.max_tags, limits.max_tag_len);
        Ok(Self { book_name, tags })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsRequest {
    pub book_name: String,
}

impl TagsRequest {
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let book_name = Validator::validate_book_name(&self.book_name, limits.max_book_name_len)?;
        Ok(Self { book_name })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// SSE payloads for `/api/recommend`, wire-compatible with the original
/// frontend: tag list first, accumulated text with every chunk, a final
/// done marker, errors inline in the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Tags { tags: Vec<String> },
    Chunk { chunk: String, text: String },
    Done { done: bool, text: String },
    Error { error: String },
}

impl StreamEvent {
    pub fn done(text: String) -> Self {
        StreamEvent::Done { done: true, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            max_book_name_len: 200,
            max_tags: 20,
            max_tag_len: 50,
            max_inferred_tags: 10,
        }
    }

    #[test]
    fn test_recommend_request_trims_name() {
        let req = RecommendRequest {
            book_name: "  Dune  ".to_string(),
            tags: vec![],
        };
        let validated = req.validated(&limits()).unwrap();
        assert_eq!(validated.book_name, "Dune");
    }

    #[test]
    fn test_recommend_request_rejects_blank_name() {
        let req = RecommendRequest {
            book_name: "   ".to_string(),
            tags: vec![],
        };
        assert!(req.validated(&limits()).is_err());
    }

    #[test]
    fn test_recommend_request_normalizes_tags() {
        let req = RecommendRequest {
            book_name: "Dune".to_string(),
            tags: vec![
                " Sci-Fi ".to_string(),
                "sci-fi".to_string(),
                String::new(),
            ],
        };
        let validated = req.validated(&limits()).unwrap();
        assert_eq!(validated.tags, vec!["sci-fi"]);
    }

    #[test]
    fn test_stream_event_wire_format() {
        let tags = StreamEvent::Tags {
            tags: vec!["sci-fi".to_string()],
        };
        assert_eq!(
            serde_json::to_string(&tags).unwrap(),
            r#"{"tags":["sci-fi"]}"#
        );

        let chunk = StreamEvent::Chunk {
            chunk: "1. ".to_string(),
            text: "1. ".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&chunk).unwrap(),
            r#"{"chunk":"1. ","text":"1. "}"#
        );

        let done = StreamEvent::done("full text".to_string());
        assert_eq!(
            serde_json::to_string(&done).unwrap(),
            r#"{"done":true,"text":"full text"}"#
        );

        let error = StreamEvent::Error {
            error: "boom".to_string(),
        };
        assert_eq!(serde_json::to_string(&error).unwrap(), r#"{"error":"boom"}"#);
    }
}
