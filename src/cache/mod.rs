// src/cache/mod.rs
//
// Output cache invalidation
//
// The engine never reads cached responses; it only announces that a tag's
// cached views are stale.

pub mod tagged_cache;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;

pub use tagged_cache::{EvictionLogEntry, TaggedOutputCache};

/// Tag carried by every cached listing and detail view of movies
pub const MOVIES_CACHE_TAG: &str = "movies";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn evict_by_tag(&self, tag: &str, cancel: &CancellationToken) -> AppResult<()>;
}
