// file: src/parser/mod.rs
// description: recommendation-stream parsing module exports
// reference: internal module structure

pub mod normalizer;
pub mod recommendation;

pub use normalizer::LineNormalizer;
pub use recommendation::RecommendationParser;
