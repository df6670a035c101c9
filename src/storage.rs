// file: src/storage.rs
// description: SQLite store for generated recommendations and search analytics
// reference: https://docs.rs/rusqlite

use crate::config::StorageConfig;
use crate::error::Result;
use crate::utils::Validator;
use rusqlite::{Connection, params};
use serde::Serialize;
use std::fs;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Persists raw recommendation text and search history. Parsed entries are
/// never stored; they are re-derived from text on demand.
pub struct SearchStore {
    conn: Mutex<Connection>,
    max_recommendation_chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_recommendations: i64,
    pub total_requests: i64,
    pub total_searches: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularSearch {
    pub book_name: String,
    pub search_count: i64,
}

impl SearchStore {
    pub fn open(config: &StorageConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&config.db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
            max_recommendation_chars: config.max_recommendation_chars,
        };
        store.init_schema()?;
        info!("Search store initialized at {}", config.db_path.display());
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recommendations (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 book_name TEXT NOT NULL,
                 tags TEXT,
                 recommendations_text TEXT NOT NULL,
                 created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                 request_count INTEGER DEFAULT 1
             );
             CREATE TABLE IF NOT EXISTS search_history (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 book_name TEXT NOT NULL,
                 tags TEXT,
                 searched_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
             );
             CREATE INDEX IF NOT EXISTS idx_book_name ON recommendations(book_name);
             CREATE INDEX IF NOT EXISTS idx_created_at ON recommendations(created_at);
             CREATE INDEX IF NOT EXISTS idx_searched_at ON search_history(searched_at);",
        )?;

        Ok(())
    }

    /// Save generated text, bumping the request counter when the same
    /// book/tags pair was saved before.
    pub fn save_recommendations(&self, book_name: &str, tags: &[String], text: &str) -> Result<()> {
        let text = if text.chars().count() > self.max_recommendation_chars {
            warn!(
                "Truncating recommendations text for {} (exceeded {} chars)",
                book_name, self.max_recommendation_chars
            );
            Validator::truncate_text(text, self.max_recommendation_chars)
        } else {
            text.to_string()
        };

        let tags_json = tags_to_json(tags)?;
        let conn = self.lock();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM recommendations WHERE book_name = ?1 AND tags IS ?2",
                params![book_name, tags_json],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(ignore_no_rows)?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE recommendations
                     SET recommendations_text = ?1,
                         request_count = request_count + 1,
                         created_at = CURRENT_TIMESTAMP
                     WHERE id = ?2",
                    params![text, id],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO recommendations (book_name, tags, recommendations_text)
                     VALUES (?1, ?2, ?3)",
                    params![book_name, tags_json, text],
                )?;
            }
        }

        debug!("Saved recommendations for: {}", book_name);
        Ok(())
    }

    pub fn log_search(&self, book_name: &str, tags: &[String]) -> Result<()> {
        let tags_json = tags_to_json(tags)?;
        let conn = self.lock();

        conn.execute(
            "INSERT INTO search_history (book_name, tags) VALUES (?1, ?2)",
            params![book_name, tags_json],
        )?;

        debug!("Logged search for: {}", book_name);
        Ok(())
    }

    pub fn popular_searches(&self, limit: usize) -> Result<Vec<PopularSearch>> {
        let limit = limit.min(100);
        let conn = self.lock();

        let mut stmt = conn.prepare(
            "SELECT book_name, COUNT(*) as search_count
             FROM search_history
             GROUP BY book_name
             ORDER BY search_count DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PopularSearch {
                book_name: row.get(0)?,
                search_count: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.lock();

        let total_recommendations: i64 =
            conn.query_row("SELECT COUNT(*) FROM recommendations", [], |row| row.get(0))?;
        let total_requests: i64 = conn.query_row(
            "SELECT COALESCE(SUM(request_count), 0) FROM recommendations",
            [],
            |row| row.get(0),
        )?;
        let total_searches: i64 =
            conn.query_row("SELECT COUNT(*) FROM search_history", [], |row| row.get(0))?;

        Ok(StoreStats {
            total_recommendations,
            total_requests,
            total_searches,
        })
    }

    pub fn reset(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch("DELETE FROM recommendations; DELETE FROM search_history;")?;
        info!("Search store cleared");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn tags_to_json(tags: &[String]) -> Result<Option<String>> {
    if tags.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(tags)?))
    }
}

fn ignore_no_rows<T>(err: rusqlite::Error) -> std::result::Result<Option<T>, rusqlite::Error> {
    match err {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> SearchStore {
        SearchStore::open(&StorageConfig {
            db_path: temp.path().join("test.db"),
            max_recommendation_chars: 100_000,
        })
        .unwrap()
    }

    #[test]
    fn test_save_and_stats() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .save_recommendations("Dune", &[], "1. Hyperion by Dan Simmons")
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_recommendations, 1);
        assert_eq!(stats.total_requests, 1);
    }

    #[test]
    fn test_resave_bumps_request_count() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.save_recommendations("Dune", &[], "first").unwrap();
        store.save_recommendations("Dune", &[], "second").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_recommendations, 1);
        assert_eq!(stats.total_requests, 2);
    }

    #[test]
    fn test_different_tags_create_distinct_rows() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.save_recommendations("Dune", &[], "untagged").unwrap();
        store
            .save_recommendations("Dune", &["sci-fi".to_string()], "tagged")
            .unwrap();

        assert_eq!(store.stats().unwrap().total_recommendations, 2);
    }

    #[test]
    fn test_truncates_overlong_text() {
        let temp = TempDir::new().unwrap();
        let store = SearchStore::open(&StorageConfig {
            db_path: temp.path().join("test.db"),
            max_recommendation_chars: 10,
        })
        .unwrap();

        store
            .save_recommendations("Dune", &[], "a very long recommendation body")
            .unwrap();

        let conn = store.lock();
        let text: String = conn
            .query_row(
                "SELECT recommendations_text FROM recommendations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(text.chars().count(), 10);
    }

    #[test]
    fn test_popular_searches_ranked() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        for _ in 0..3 {
            store.log_search("Dune", &[]).unwrap();
        }
        store.log_search("Hyperion", &[]).unwrap();

        let popular = store.popular_searches(10).unwrap();
        assert_eq!(popular[0].book_name, "Dune");
        assert_eq!(popular[0].search_count, 3);
        assert_eq!(popular[1].book_name, "Hyperion");
    }

    #[test]
    fn test_reset_clears_everything() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.save_recommendations("Dune", &[], "text").unwrap();
        store.log_search("Dune", &[]).unwrap();
        store.reset().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_recommendations, 0);
        assert_eq!(stats.total_searches, 0);
    }
}
