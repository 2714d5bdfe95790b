// src/cache/tagged_cache.rs
//
// In-process output cache with tag-based eviction.
//
// DESIGN PRINCIPLES:
// 1. Entries are opaque JSON values keyed by string
// 2. Every entry carries the tags it was stored under
// 3. Evicting a tag drops every entry carrying it, in one step
// 4. Observable - every eviction is logged

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::CacheInvalidator;
use crate::db::ensure_active;
use crate::error::{AppError, AppResult};

struct CacheEntry {
    tags: BTreeSet<String>,
    value: serde_json::Value,
}

/// A logged eviction for debugging and tracing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionLogEntry {
    pub tag: String,
    pub evicted: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Cached responses grouped by tag.
///
/// Cloning shares the same underlying store.
#[derive(Clone, Default)]
pub struct TaggedOutputCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    eviction_log: Arc<RwLock<Vec<EvictionLogEntry>>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Other("Output cache lock poisoned".to_string())
}

impl TaggedOutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a cached value under the given tags
    pub fn store<I, S>(&self, key: impl Into<String>, tags: I, value: serde_json::Value) -> AppResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = CacheEntry {
            tags: tags.into_iter().map(Into::into).collect(),
            value,
        };

        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.into(), entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every entry carrying `tag`; returns how many went
    pub fn evict_tag(&self, tag: &str) -> AppResult<usize> {
        let evicted = {
            let mut entries = self.entries.write().map_err(poisoned)?;
            let before = entries.len();
            entries.retain(|_, entry| !entry.tags.contains(tag));
            before - entries.len()
        };

        self.eviction_log
            .write()
            .map_err(poisoned)?
            .push(EvictionLogEntry {
                tag: tag.to_string(),
                evicted,
                occurred_at: Utc::now(),
            });

        log::debug!("[CACHE] evicted tag '{}' | {} entries", tag, evicted);
        Ok(evicted)
    }

    /// Get the eviction log (for debugging)
    pub fn eviction_log(&self) -> AppResult<Vec<EvictionLogEntry>> {
        Ok(self.eviction_log.read().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl CacheInvalidator for TaggedOutputCache {
    async fn evict_by_tag(&self, tag: &str, cancel: &CancellationToken) -> AppResult<()> {
        ensure_active(cancel)?;
        self.evict_tag(tag)?;
        Ok(())
    }
}
