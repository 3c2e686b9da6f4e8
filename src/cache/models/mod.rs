/// 缓存数据模型
/// 定义进程内存储的记录结构
// TTL 缓存条目
pub mod entry;

// 限流记录
pub mod rate_limit;

// 重新导出常用类型
pub use entry::{CacheEntry, CacheStats, expiry_after};
pub use rate_limit::{RateLimitDecision, RateLimitRecord, RateLimitSnapshot, RateLimitStats};
