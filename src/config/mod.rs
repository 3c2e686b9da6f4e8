use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_UNSPLASH_API_URL: &str = "https://api.unsplash.com";

/// 各类时长配置的上限（365 天）
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// 单个调用方在一个固定窗口内允许的请求数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` 表示未配置凭证，所有搜索请求返回 500
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,
    pub cache_ttl_secs: u64,
    pub cache_sweep_interval_secs: u64,
    pub rate_limit_sweep_interval_secs: u64,
    pub upstream_timeout_secs: u64,
    pub allowed_origin: String,
    pub server_host: String,
    pub server_port: u16,
    /// 统计接口会暴露调用方 IP 和查询文本，默认关闭
    pub stats_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            unsplash_access_key: None,
            unsplash_api_url: DEFAULT_UNSPLASH_API_URL.to_string(),
            rate_limit_requests: 10,
            rate_limit_window_ms: 60 * 1000,
            cache_ttl_secs: 24 * 60 * 60,
            cache_sweep_interval_secs: 5 * 60,
            rate_limit_sweep_interval_secs: 60,
            upstream_timeout_secs: 30,
            allowed_origin: "http://localhost:3000".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            stats_enabled: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// 从任意键值来源构建配置，缺失的键使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let text = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            unsplash_access_key: text("UNSPLASH_ACCESS_KEY"),
            unsplash_api_url: text("UNSPLASH_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.unsplash_api_url),
            rate_limit_requests: positive(&lookup, "RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window_ms: bounded(
                &lookup,
                "RATE_LIMIT_WINDOW_MS",
                defaults.rate_limit_window_ms,
                MAX_DURATION_SECS * 1000,
            )?,
            cache_ttl_secs: bounded(&lookup, "CACHE_TTL_SECS", defaults.cache_ttl_secs, MAX_DURATION_SECS)?,
            cache_sweep_interval_secs: bounded(
                &lookup,
                "CACHE_SWEEP_INTERVAL_SECS",
                defaults.cache_sweep_interval_secs,
                MAX_DURATION_SECS,
            )?,
            rate_limit_sweep_interval_secs: bounded(
                &lookup,
                "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                defaults.rate_limit_sweep_interval_secs,
                MAX_DURATION_SECS,
            )?,
            upstream_timeout_secs: bounded(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
                MAX_DURATION_SECS,
            )?,
            allowed_origin: text("SITE_URL").unwrap_or(defaults.allowed_origin),
            server_host: text("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed(&lookup, "SERVER_PORT", defaults.server_port)?,
            stats_enabled: parsed(&lookup, "STATS_ENABLED", defaults.stats_enabled)?,
        })
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            limit: self.rate_limit_requests,
            window: Duration::from_millis(self.rate_limit_window_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_interval_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

fn positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
{
    let value = parsed(lookup, var, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
        });
    }
    Ok(value)
}

// 超过上限的时长会让 `Instant + Duration` 溢出
fn bounded<F>(lookup: &F, var: &'static str, default: u64, max: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = positive(lookup, var, default)?;
    if value > max {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.unsplash_access_key.is_none());
        assert_eq!(config.unsplash_api_url, DEFAULT_UNSPLASH_API_URL);
        assert_eq!(
            config.rate_limit_policy(),
            RateLimitPolicy {
                limit: 10,
                window: Duration::from_secs(60)
            }
        );
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.cache_sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.rate_limit_sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("UNSPLASH_ACCESS_KEY", " secret "),
            ("UNSPLASH_API_URL", "http://127.0.0.1:9000/"),
            ("RATE_LIMIT_REQUESTS", "2"),
            ("RATE_LIMIT_WINDOW_MS", "1500"),
            ("SITE_URL", "https://shop.example"),
        ]))
        .unwrap();
        assert_eq!(config.unsplash_access_key.as_deref(), Some("secret"));
        assert_eq!(config.unsplash_api_url, "http://127.0.0.1:9000");
        assert_eq!(config.rate_limit_policy().limit, 2);
        assert_eq!(config.rate_limit_policy().window, Duration::from_millis(1500));
        assert_eq!(config.allowed_origin, "https://shop.example");
    }

    #[test]
    fn blank_credential_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("UNSPLASH_ACCESS_KEY", "   ")])).unwrap();
        assert!(config.unsplash_access_key.is_none());
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = Config::from_lookup(lookup(&[("RATE_LIMIT_REQUESTS", "ten")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "RATE_LIMIT_REQUESTS",
                ..
            }
        ));
    }

    #[test]
    fn rejects_durations_beyond_bound() {
        let err = Config::from_lookup(lookup(&[("CACHE_TTL_SECS", "18446744073709551615")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "CACHE_TTL_SECS",
                ..
            }
        ));

        let too_long = (MAX_DURATION_SECS * 1000 + 1).to_string();
        let err = Config::from_lookup(lookup(&[("RATE_LIMIT_WINDOW_MS", too_long.as_str())])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "RATE_LIMIT_WINDOW_MS",
                ..
            }
        ));

        let max = MAX_DURATION_SECS.to_string();
        let config = Config::from_lookup(lookup(&[("CACHE_TTL_SECS", max.as_str())])).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(MAX_DURATION_SECS));
    }

    #[test]
    fn stats_disabled_unless_requested() {
        assert!(!Config::from_lookup(lookup(&[])).unwrap().stats_enabled);
        let config = Config::from_lookup(lookup(&[("STATS_ENABLED", "true")])).unwrap();
        assert!(config.stats_enabled);
    }

    #[test]
    fn rejects_zero_window() {
        let err = Config::from_lookup(lookup(&[("RATE_LIMIT_WINDOW_MS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "RATE_LIMIT_WINDOW_MS",
                ..
            }
        ));
    }
}
