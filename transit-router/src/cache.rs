//! Caching layer for access and egress legs.
//!
//! Finding the legs around a location means running a street search, and
//! the same origin is searched repeatedly while a user pages through
//! results. Legs are cached per (location, mode, kind). Errors are never
//! cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{AccessEgressKind, AccessEgressLeg, Location, SearchError, StreetMode};
use crate::router::AccessEgressProvider;

/// Cache key for legs: (location, street mode, access or egress).
type LegKey = (Location, StreetMode, AccessEgressKind);

/// Cached legs entry.
type LegEntry = Arc<Vec<AccessEgressLeg>>;

/// Configuration for the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cached entries, in seconds.
    pub ttl_secs: u64,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Access/egress provider with caching.
///
/// Wraps another provider and caches its successful answers.
pub struct CachedAccessEgress<P> {
    inner: P,
    legs: MokaCache<LegKey, LegEntry>,
}

impl<P: AccessEgressProvider> CachedAccessEgress<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let legs = MokaCache::builder()
            .time_to_live(config.ttl())
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, legs }
    }

    /// Access the underlying provider for lookups that bypass the cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.legs.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.legs.invalidate_all();
    }
}

#[async_trait]
impl<P: AccessEgressProvider> AccessEgressProvider for CachedAccessEgress<P> {
    async fn find_legs(
        &self,
        location: &Location,
        mode: StreetMode,
        kind: AccessEgressKind,
    ) -> Result<Vec<AccessEgressLeg>, SearchError> {
        let key = (location.clone(), mode, kind);

        // Try cache first
        if let Some(cached) = self.legs.get(&key).await {
            trace!(location = %location, ?mode, ?kind, "access/egress cache hit");
            return Ok(cached.as_ref().clone());
        }

        let legs = self.inner.find_legs(location, mode, kind).await?;
        self.legs.insert(key, Arc::new(legs.clone())).await;

        Ok(legs)
    }
}
