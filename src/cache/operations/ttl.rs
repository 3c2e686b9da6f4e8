use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::models::{CacheEntry, CacheStats, expiry_after};

/// 带逐条过期时间的进程内缓存
///
/// 读取时惰性检查过期，`sweep` 只负责回收内存，
/// 不影响 `get`/`has` 的正确性。
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 覆盖写入，过期时间为当前时刻加 `ttl`
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = expiry_after(Instant::now(), ttl);
        self.entries.insert(
            key.into(),
            CacheEntry {
                data: value,
                expires_at,
            },
        );
    }

    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.evict(key, now);
        }
        !expired
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// 删除所有已过期条目，返回删除数量
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// 当前条目数，可能包含尚未清理的过期条目
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys: self.entries.iter().map(|entry| entry.key().clone()).collect(),
        }
    }

    // 只删除仍然过期的条目，避免误删并发写入的新值
    fn evict(&self, key: &str, now: Instant) {
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            // 释放读锁后再删除
            drop(entry);
            self.evict(key, now);
            return None;
        }
        Some(entry.data.clone())
    }

    /// 命中时直接返回缓存值，否则调用 `producer` 并在成功时写入缓存。
    ///
    /// `producer` 失败时错误原样返回，不做负缓存。
    pub async fn with_cache<F, Fut, E>(&self, key: &str, producer: F, ttl: Duration) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(cached) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache HIT: {}", key);
            return Ok(cached);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Cache MISS: {}", key);
        let value = producer().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set("k", 7, TTL);
        assert_eq!(cache.get("k"), Some(7));
        assert!(cache.has("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_visible_until_expiry_instant() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), TTL);

        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty(), "expired entry is removed on read");
    }

    #[tokio::test(start_paused = true)]
    async fn has_removes_expired_entry() {
        let cache = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(1));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_reads_do_not_mutate() {
        let cache = TtlCache::new();
        cache.set("k", vec![1, 2, 3], TTL);
        for _ in 0..5 {
            assert_eq!(cache.get("k"), Some(vec![1, 2, 3]));
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_write_wins_and_refreshes_expiry() {
        let cache = TtlCache::new();
        cache.set("k", "old", Duration::from_secs(1));
        cache.set("k", "new", TTL);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.get("k"), Some("new"));
    }

    #[test]
    fn oversized_ttl_saturates() {
        let cache = TtlCache::new();
        cache.set("k", 1, Duration::MAX);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn delete_and_clear_are_idempotent() {
        let cache = TtlCache::new();
        cache.set("a", 1, TTL);
        cache.set("b", 2, TTL);
        cache.delete("a");
        cache.delete("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_expired() {
        let cache = TtlCache::new();
        cache.set("short", 1, Duration::from_secs(1));
        cache.set("long", 2, TTL);
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.stats().keys, vec!["long".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn with_cache_invokes_producer_once_within_ttl() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value: Result<u32, String> = cache
                .with_cache(
                    "k",
                    move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(42)
                    },
                    TTL,
                )
                .await;
            assert_eq!(value, Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn with_cache_refetches_after_expiry() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let produce = move || async move { Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst)) };

        assert_eq!(cache.with_cache("k", produce, TTL).await, Ok(0));
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(cache.with_cache("k", produce, TTL).await, Ok(1));
    }

    #[tokio::test]
    async fn with_cache_does_not_store_failures() {
        let cache: TtlCache<u32> = TtlCache::new();

        let failed = cache
            .with_cache("k", || async { Err("upstream down".to_string()) }, TTL)
            .await;
        assert_eq!(failed, Err("upstream down".to_string()));
        assert!(!cache.has("k"));

        let recovered: Result<u32, String> = cache.with_cache("k", || async { Ok(5) }, TTL).await;
        assert_eq!(recovered, Ok(5));
        assert_eq!(cache.get("k"), Some(5));
    }
}
