// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{AppError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAiConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub tags_max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub max_recommendation_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub max_book_name_len: usize,
    pub max_tags: usize,
    pub max_tag_len: usize,
    pub max_inferred_tags: usize,
}

// Blurb-promotion thresholds are tunable heuristics, not invariants.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub blurb_promotion_min_chars: usize,
    pub blurb_promotion_min_details: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            blurb_promotion_min_chars: 80,
            blurb_promotion_min_details: 2,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BOOK_SCOUT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        // The original deployment reads the bare OPENAI_API_KEY variable.
        if config.openai.api_key.as_deref().map(str::trim).unwrap_or("").is_empty() {
            config.openai.api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                allowed_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            openai: OpenAiConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key: std::env::var("OPENAI_API_KEY")
                    .ok()
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
                max_tokens: 2000,
                tags_max_tokens: 150,
                temperature: 0.7,
                timeout_secs: 30,
            },
            cache: CacheConfig {
                ttl_secs: 3600,
                max_entries: 1000,
            },
            storage: StorageConfig {
                db_path: PathBuf::from("data/recommendations.db"),
                max_recommendation_chars: 100_000,
            },
            limits: LimitsConfig {
                max_book_name_len: 200,
                max_tags: 20,
                max_tag_len: 50,
                max_inferred_tags: 10,
            },
            extraction: ExtractionConfig::default(),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "OPENAI_API_KEY not found. Set it in the environment, a .env file, \
                     or [openai].api_key in the config file"
                        .to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port cannot be 0".to_string()));
        }

        if self.openai.max_tokens == 0 {
            return Err(AppError::Config(
                "openai.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(AppError::Config(
                "cache.max_entries must be greater than 0".to_string(),
            ));
        }

        if self.limits.max_book_name_len == 0 {
            return Err(AppError::Config(
                "limits.max_book_name_len must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_book_name_len, 200);
        assert_eq!(config.extraction.blurb_promotion_min_chars, 80);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let mut config = Config::default_config();
        config.openai.max_tokens = 0;
        assert!(config.validate().is_err());
    }
}
