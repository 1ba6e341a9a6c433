//! Memory repository for user-taught facts
//!
//! A fact is a single key→value pair ("wifi password" → "sunshine123").
//! Keys are case-normalized and trimmed at this boundary, so lookups are
//! insensitive to casing and surrounding whitespace. Last write wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DbPool;
use crate::{Error, Result};

/// A stored fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    /// Normalized key
    pub key: String,
    /// Stored value
    pub value: String,
    /// When the fact was first stored
    pub created_at: DateTime<Utc>,
    /// When the fact was last overwritten
    pub updated_at: DateTime<Utc>,
}

/// Repository for fact storage
///
/// Thread-safety contract: safe for a single concurrent caller (the one
/// dispatcher task). The pool hands out connections; no extra locking.
#[derive(Clone)]
pub struct MemoryRepo {
    pool: DbPool,
}

impl MemoryRepo {
    /// Create a new memory repository
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store or overwrite a fact
    ///
    /// # Errors
    ///
    /// Returns error if the database write fails
    pub fn remember(&self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key);
        let now = Utc::now().to_rfc3339();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO facts (key, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            rusqlite::params![key, value.trim(), now],
        )?;

        tracing::debug!(key = %key, "fact stored");
        Ok(())
    }

    /// Look up a fact by key
    ///
    /// # Errors
    ///
    /// Returns error if the database read fails
    pub fn recall(&self, key: &str) -> Result<Option<String>> {
        let key = normalize_key(key);

        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM facts WHERE key = ?1")?;
        let value = stmt
            .query_row([&key], |row| row.get::<_, String>(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(value)
    }

    /// Remove a fact, returning whether a removal occurred
    ///
    /// # Errors
    ///
    /// Returns error if the database write fails
    pub fn forget(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);

        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM facts WHERE key = ?1", [&key])?;

        if deleted > 0 {
            tracing::debug!(key = %key, "fact forgotten");
        }
        Ok(deleted > 0)
    }

    /// List all stored facts, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns error if the database read fails
    pub fn list(&self) -> Result<Vec<Fact>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value, created_at, updated_at FROM facts ORDER BY updated_at DESC",
        )?;

        let facts = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(facts
            .into_iter()
            .map(|(key, value, created_at, updated_at)| Fact {
                key,
                value,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
            })
            .collect())
    }

    fn conn(&self) -> Result<super::DbConn> {
        self.pool.get().map_err(|e| Error::Database(e.to_string()))
    }
}

/// Normalize a fact key: trim and lowercase
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Parse an RFC 3339 timestamp, falling back to the epoch on corruption
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
