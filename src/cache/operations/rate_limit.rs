use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::models::{
    RateLimitDecision, RateLimitRecord, RateLimitSnapshot, RateLimitStats, expiry_after,
};

/// 固定窗口限流器
///
/// 每个标识只保存一条计数记录。窗口对齐时最多放行 `limit` 个请求，
/// 跨越窗口边界时最多可能放行 `2 * limit - 1` 个。
#[derive(Default)]
pub struct RateLimiter {
    records: DashMap<String, RateLimitRecord>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次请求并返回准入结果
    ///
    /// 先递增再比较，所以第 `limit + 1` 个请求是第一个被拒绝的。
    pub fn check(&self, identifier: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        // entry 持有分片写锁，递增和比较在同一个临界区内完成
        let mut record = self
            .records
            .entry(identifier.to_string())
            .or_insert_with(|| RateLimitRecord {
                count: 0,
                window_reset_at: expiry_after(now, window),
            });

        if record.count == 0 || record.window_elapsed(now) {
            *record = RateLimitRecord {
                count: 1,
                window_reset_at: expiry_after(now, window),
            };
            return RateLimitDecision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at: record.window_reset_at,
            };
        }

        record.count = record.count.saturating_add(1);
        if record.count > limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_at: record.window_reset_at,
            };
        }

        RateLimitDecision {
            allowed: true,
            remaining: limit - record.count,
            reset_at: record.window_reset_at,
        }
    }

    /// 查询当前窗口状态，不计数
    pub fn peek(&self, identifier: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        match self.records.get(identifier) {
            Some(record) if !record.window_elapsed(now) => RateLimitDecision {
                allowed: record.count < limit,
                remaining: limit.saturating_sub(record.count),
                reset_at: record.window_reset_at,
            },
            _ => RateLimitDecision {
                allowed: true,
                remaining: limit,
                reset_at: expiry_after(now, window),
            },
        }
    }

    pub fn reset(&self, identifier: &str) {
        self.records.remove(identifier);
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    /// 删除窗口已结束的记录，返回删除数量
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        self.records.retain(|_, record| !record.window_elapsed(now));
        before.saturating_sub(self.records.len())
    }

    pub fn stats(&self) -> RateLimitStats {
        let now = Instant::now();
        let entries: Vec<RateLimitSnapshot> = self
            .records
            .iter()
            .map(|record| RateLimitSnapshot {
                identifier: record.key().clone(),
                count: record.count,
                expires_in_ms: record.window_reset_at.saturating_duration_since(now).as_millis() as u64,
            })
            .collect();
        RateLimitStats {
            active_identifiers: entries.len(),
            entries,
        }
    }
}
