// 上游图片搜索服务

mod unsplash;

pub use unsplash::UnsplashClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// 透传给上游的搜索参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub per_page: u32,
    pub page: u32,
    pub orientation: String,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Unsplash API error: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("Unsplash request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// 图片搜索服务接口，测试中可以替换为假实现
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    async fn search_photos(&self, request: &SearchRequest) -> Result<Value, UpstreamError>;
}
