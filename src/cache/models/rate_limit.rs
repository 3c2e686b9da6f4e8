use serde::Serialize;
use tokio::time::Instant;

/// 单个标识在当前窗口内的计数
#[derive(Debug, Clone)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitRecord {
    pub fn window_elapsed(&self, now: Instant) -> bool {
        now > self.window_reset_at
    }
}

/// 一次准入判断的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

impl RateLimitDecision {
    /// 距离窗口重置的秒数，向上取整
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let millis = self.reset_at.saturating_duration_since(now).as_millis() as u64;
        millis.div_ceil(1000)
    }

    /// 窗口重置时刻的 Unix 毫秒时间戳
    pub fn reset_epoch_millis(&self, now: Instant) -> i64 {
        let until_reset = self.reset_at.saturating_duration_since(now).as_millis() as i64;
        chrono::Utc::now().timestamp_millis() + until_reset
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSnapshot {
    pub identifier: String,
    pub count: u32,
    pub expires_in_ms: u64,
}

/// 限流器统计信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub active_identifiers: usize,
    pub entries: Vec<RateLimitSnapshot>,
}
