// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod parser;
pub mod server;
pub mod storage;
pub mod utils;

pub use cache::{CacheStats, RecommendationCache};
pub use config::{
    CacheConfig, Config, ExtractionConfig, LimitsConfig, OpenAiConfig, ServerConfig, StorageConfig,
};
pub use error::{AppError, Result};
pub use extractor::RatingExtractor;
pub use llm::{ContentStream, OpenAiClient};
pub use models::{
    BookEntry, Rating, RatingLinks, RatingSource, RecommendRequest, StreamEvent, TagsRequest,
    TagsResponse,
};
pub use parser::{LineNormalizer, RecommendationParser};
pub use storage::{PopularSearch, SearchStore, StoreStats};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
