use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Query, Request, State},
    response::{IntoResponse, Response},
};
use tokio::time::Instant;

use super::model::{SearchParams, StatsResponse};
use crate::{
    AppState,
    cache::keys,
    error::AppError,
    middleware::{RateLimitHeaders, apply_rate_limit_headers, client_identifier, enforce_rate_limit},
};

#[axum::debug_handler]
pub async fn search(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let Some(provider) = state.provider.clone() else {
        tracing::error!("UNSPLASH_ACCESS_KEY is not configured; rejecting search request");
        return Err(AppError::MissingCredential);
    };

    // 按键值对解析，重复参数不会导致整个查询被拒绝
    let params = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map(|Query(pairs)| SearchParams::from_pairs(pairs))
        .unwrap_or_default();
    let search = params.validate()?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identifier = client_identifier(request.headers(), peer);
    let policy = state.config.rate_limit_policy();
    enforce_rate_limit(&state.limiter, &identifier, policy)?;

    let cache_key = keys::search_results(
        &search.query,
        search.per_page,
        search.page,
        &search.orientation,
    );
    let data = state
        .cache
        .with_cache(
            &cache_key,
            move || async move { provider.search_photos(&search).await },
            state.config.cache_ttl(),
        )
        .await
        .inspect_err(|e| tracing::error!("Unsplash search error: {}", e))?;

    let info = state.limiter.peek(&identifier, policy.limit, policy.window);
    let mut response = Json(data).into_response();
    apply_rate_limit_headers(
        response.headers_mut(),
        &RateLimitHeaders::from_decision(policy.limit, &info, Instant::now()),
    );
    Ok(response)
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache: state.cache.stats(),
        rate_limit: state.limiter.stats(),
    })
}
