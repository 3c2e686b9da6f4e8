// 进程内缓存模块
// 包含 TTL 缓存、固定窗口限流器以及后台清理任务

pub mod keys;
pub mod models;
pub mod operations;
pub mod sweeper;

// 重新导出常用类型，方便其他模块使用
pub use models::{CacheStats, RateLimitDecision, RateLimitStats};
pub use operations::{RateLimiter, TtlCache};
