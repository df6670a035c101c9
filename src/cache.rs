// file: src/cache.rs
// description: in-memory TTL cache for generated recommendation text
// reference: keyed by hash of normalized book name plus sorted tags

use crate::config::CacheConfig;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

pub struct RecommendationCache {
    inner: Mutex<HashMap<String, CacheSlot>>,
    ttl: Duration,
    max_entries: usize,
}

struct CacheSlot {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl RecommendationCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl: Duration::from_secs(config.ttl_secs),
            max_entries: config.max_entries,
        }
    }

    /// Same book with the same tag set hits the same slot regardless of tag
    /// order or casing.
    pub fn cache_key(book_name: &str, tags: &[String]) -> String {
        let mut sorted_tags: Vec<String> = tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        sorted_tags.sort();

        let mut hasher = Sha256::new();
        hasher.update(book_name.trim().to_lowercase().as_bytes());
        for tag in &sorted_tags {
            hasher.update(b":");
            hasher.update(tag.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, book_name: &str, tags: &[String]) -> Option<String> {
        let key = Self::cache_key(book_name, tags);
        let mut map = self.lock();

        match map.get(&key) {
            Some(slot) if Instant::now() < slot.expires_at => {
                debug!("Cache hit for key: {}...", &key[..8]);
                Some(slot.value.clone())
            }
            Some(_) => {
                map.remove(&key);
                debug!("Cache expired for key: {}...", &key[..8]);
                None
            }
            None => {
                debug!("Cache miss for key: {}...", &key[..8]);
                None
            }
        }
    }

    pub fn set(&self, book_name: &str, tags: &[String], value: &str) {
        let key = Self::cache_key(book_name, tags);
        let mut map = self.lock();

        if map.len() >= self.max_entries && !map.contains_key(&key) {
            let now = Instant::now();
            map.retain(|_, slot| slot.expires_at > now);

            // Still full after purging expired entries: drop the slot closest
            // to expiry.
            if map.len() >= self.max_entries {
                if let Some(oldest) = map
                    .iter()
                    .min_by_key(|(_, slot)| slot.expires_at)
                    .map(|(k, _)| k.clone())
                {
                    map.remove(&oldest);
                    debug!("Cache full, evicted entry: {}...", &oldest[..8]);
                }
            }
        }

        map.insert(
            key,
            CacheSlot {
                value: value.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            max_entries: self.max_entries,
            ttl_secs: self.ttl.as_secs(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheSlot>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
