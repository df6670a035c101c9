// file: src/extractor/mod.rs
// description: rating extraction module exports
// reference: internal module structure

pub mod patterns;
pub mod ratings;

pub use ratings::{RatingExtractor, amazon_search_url, goodreads_search_url};
