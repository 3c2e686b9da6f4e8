use std::sync::Arc;

use config::Config;
use serde_json::Value;

use cache::{RateLimiter, TtlCache};
use upstream::ImageSearchProvider;

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod upstream;

/// 请求处理共享的服务对象，每个实例拥有独立的缓存和限流状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<TtlCache<Value>>,
    pub limiter: Arc<RateLimiter>,
    /// 未配置凭证时为 `None`
    pub provider: Option<Arc<dyn ImageSearchProvider>>,
}

impl AppState {
    pub fn new(config: Config, provider: Option<Arc<dyn ImageSearchProvider>>) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(TtlCache::new()),
            limiter: Arc::new(RateLimiter::new()),
            provider,
        }
    }
}
