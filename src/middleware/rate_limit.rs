use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tokio::time::Instant;

use crate::{
    cache::{RateLimitDecision, RateLimiter},
    config::RateLimitPolicy,
    error::AppError,
};

/// 无法识别来源时使用的标识
pub const UNKNOWN_CLIENT: &str = "unknown";

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// 返回给客户端的限流信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: u32,
    pub remaining: u32,
    pub reset_epoch_ms: i64,
}

impl RateLimitHeaders {
    pub fn from_decision(limit: u32, decision: &RateLimitDecision, now: Instant) -> Self {
        Self {
            limit,
            remaining: decision.remaining,
            reset_epoch_ms: decision.reset_epoch_millis(now),
        }
    }
}

pub fn apply_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitHeaders) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(info.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(info.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(info.reset_epoch_ms));
}

/// 获取调用方标识
///
/// 优先使用代理转发头，其次使用连接信息中的 IP，都没有时返回 `"unknown"`
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_ip = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        });

    match header_ip {
        Some(ip) => ip.to_string(),
        // 降级使用连接IP
        None => peer
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
    }
}

/// 计数一次请求，超出限制时返回 `AppError::RateLimited`
pub fn enforce_rate_limit(
    limiter: &RateLimiter,
    identifier: &str,
    policy: RateLimitPolicy,
) -> Result<RateLimitDecision, AppError> {
    let decision = limiter.check(identifier, policy.limit, policy.window);
    if decision.allowed {
        return Ok(decision);
    }

    let now = Instant::now();
    let retry_after_secs = decision.retry_after_secs(now);
    tracing::warn!("Rate limit exceeded for IP: {}", identifier);
    Err(AppError::RateLimited {
        headers: RateLimitHeaders::from_decision(policy.limit, &decision, now),
        retry_after_secs,
    })
}
