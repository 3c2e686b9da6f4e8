use serde::Serialize;

use crate::{
    cache::{CacheStats, RateLimitStats},
    error::AppError,
    upstream::SearchRequest,
};

pub const MIN_PER_PAGE: i64 = 1;
pub const MAX_PER_PAGE: i64 = 30;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ORIENTATION: &str = "squarish";

/// 原始查询参数，数值字段保留字符串以便返回自定义错误信息
#[derive(Debug, Default)]
pub struct SearchParams {
    pub query: Option<String>,
    pub per_page: Option<String>,
    pub page: Option<String>,
    pub orientation: Option<String>,
}

impl SearchParams {
    /// 重复的参数只取第一次出现的值，未知参数忽略
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = SearchParams::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "query" => &mut params.query,
                "per_page" => &mut params.per_page,
                "page" => &mut params.page,
                "orientation" => &mut params.orientation,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    pub fn validate(self) -> Result<SearchRequest, AppError> {
        let query = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(AppError::MissingQuery)?
            .to_string();

        let per_page = match non_empty(&self.per_page) {
            None => DEFAULT_PER_PAGE,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if (MIN_PER_PAGE..=MAX_PER_PAGE).contains(&n) => n as u32,
                _ => return Err(AppError::PerPageOutOfRange),
            },
        };

        let page = match non_empty(&self.page) {
            None => DEFAULT_PAGE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(AppError::InvalidPage),
            },
        };

        let orientation = non_empty(&self.orientation)
            .unwrap_or(DEFAULT_ORIENTATION)
            .to_string();

        Ok(SearchRequest {
            query,
            per_page,
            page,
            orientation,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache: CacheStats,
    pub rate_limit: RateLimitStats,
}
