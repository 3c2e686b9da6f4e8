use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

// 约 30 年，溢出时的过期上限
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + ttl`，溢出时截断到远期时刻而不是 panic
pub fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

/// 带过期时间的缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// `now == expires_at` 时条目仍然可见
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub keys: Vec<String>,
}
