/// 缓存操作
/// 提供进程内存储的功能实现

// TTL 缓存
pub mod ttl;

// 固定窗口限流
pub mod rate_limit;

// 重新导出常用操作
pub use rate_limit::RateLimiter;
pub use ttl::TtlCache;
