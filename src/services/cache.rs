use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::api::dto::EmployeeDto;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub count_cached: bool,
    pub hits: u64,
    pub misses: u64,
}

/// Eviction generation observed before a store read. A fill carrying an
/// older ticket lost a race with a write and must not be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

/// Read-through cache for single employees and the total count.
pub struct EmployeeCache {
    enabled: bool,
    by_id: RwLock<HashMap<i64, EmployeeDto>>,
    count: RwLock<Option<i64>>,
    /// Bumped under the map lock on every eviction.
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EmployeeCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            by_id: RwLock::new(HashMap::new()),
            count: RwLock::new(None),
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Take before reading the store; pass to `put` / `put_count`.
    pub fn ticket(&self) -> CacheTicket {
        CacheTicket(self.generation.load(Ordering::Acquire))
    }

    fn is_current(&self, ticket: CacheTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub async fn get(&self, id: i64) -> Option<EmployeeDto> {
        if !self.enabled {
            return None;
        }
        let found = self.by_id.read().await.get(&id).cloned();
        self.record(found.is_some());
        found
    }

    /// Caches `dto` unless an eviction happened since `ticket` was taken,
    /// in which case whatever is cached for the id is dropped instead.
    pub async fn put(&self, ticket: CacheTicket, dto: &EmployeeDto) {
        if let (true, Some(id)) = (self.enabled, dto.id) {
            let mut by_id = self.by_id.write().await;
            if self.is_current(ticket) {
                by_id.insert(id, dto.clone());
            } else {
                by_id.remove(&id);
            }
        }
    }

    pub async fn evict(&self, id: i64) {
        let mut by_id = self.by_id.write().await;
        by_id.remove(&id);
        self.bump();
    }

    pub async fn get_count(&self) -> Option<i64> {
        if !self.enabled {
            return None;
        }
        let found = *self.count.read().await;
        self.record(found.is_some());
        found
    }

    pub async fn put_count(&self, ticket: CacheTicket, count: i64) {
        if self.enabled {
            let mut cached = self.count.write().await;
            *cached = self.is_current(ticket).then_some(count);
        }
    }

    pub async fn evict_count(&self) {
        let mut cached = self.count.write().await;
        *cached = None;
        self.bump();
    }

    pub async fn clear(&self) {
        let mut by_id = self.by_id.write().await;
        by_id.clear();
        self.bump();
        drop(by_id);
        self.evict_count().await;
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.by_id.read().await.len(),
            count_cached: self.count.read().await.is_some(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(id: i64) -> EmployeeDto {
        EmployeeDto { id: Some(id), ..EmployeeDto::new("Jane Doe", "Engineer") }
    }

    #[tokio::test]
    async fn tracks_hits_and_misses() {
        let cache = EmployeeCache::new(true);
        assert!(cache.get(1).await.is_none());
        cache.put(cache.ticket(), &dto(1)).await;
        assert_eq!(cache.get(1).await, Some(dto(1)));

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn evicts_and_clears() {
        let cache = EmployeeCache::new(true);
        cache.put(cache.ticket(), &dto(1)).await;
        cache.put(cache.ticket(), &dto(2)).await;
        cache.put_count(cache.ticket(), 2).await;

        cache.evict(1).await;
        assert!(cache.get(1).await.is_none());
        assert_eq!(cache.get_count().await, Some(2));

        cache.clear().await;
        assert!(cache.get(2).await.is_none());
        assert!(cache.get_count().await.is_none());
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = EmployeeCache::new(false);
        cache.put(cache.ticket(), &dto(1)).await;
        cache.put_count(cache.ticket(), 5).await;
        assert!(cache.get(1).await.is_none());
        assert!(cache.get_count().await.is_none());
        let stats = cache.stats().await;
        assert_eq!((stats.entries, stats.hits, stats.misses), (0, 0, 0));
    }

    #[tokio::test]
    async fn unsaved_dto_is_not_cached() {
        let cache = EmployeeCache::new(true);
        cache.put(cache.ticket(), &EmployeeDto::new("Jane Doe", "Engineer")).await;
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn fills_that_raced_an_eviction_are_dropped() {
        let cache = EmployeeCache::new(true);
        cache.put(cache.ticket(), &dto(1)).await;

        // A reader loaded id 1 and the count, then a delete evicted both.
        let stale = cache.ticket();
        cache.evict(1).await;
        cache.evict_count().await;

        cache.put(stale, &dto(1)).await;
        cache.put_count(stale, 3).await;
        assert!(cache.get(1).await.is_none());
        assert!(cache.get_count().await.is_none());

        let fresh = cache.ticket();
        cache.put_count(fresh, 2).await;
        assert_eq!(cache.get_count().await, Some(2));
    }

    #[tokio::test]
    async fn stale_put_drops_the_older_entry() {
        let cache = EmployeeCache::new(true);
        cache.put(cache.ticket(), &dto(1)).await;

        let stale = cache.ticket();
        cache.evict_count().await;
        let mut updated = dto(1);
        updated.role = Some("Manager".to_string());
        cache.put(stale, &updated).await;

        assert!(cache.get(1).await.is_none());
    }
}
