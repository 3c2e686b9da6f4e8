use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    AppState,
    config::Config,
    middleware::{log_errors, security_headers},
    routes,
};

pub const API_BASE_URI: &str = "/api/unsplash";

// 图片搜索相关的路由，统计接口包含调用方 IP，只在显式开启时注册
pub fn unsplash_routes(config: &Config) -> Router<AppState> {
    let router = Router::new().route("/search", get(routes::unsplash::search));
    if config.stats_enabled {
        router.route("/stats", get(routes::unsplash::stats))
    } else {
        router
    }
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let layers = ServiceBuilder::new()
        .layer(from_fn(log_errors))
        .layer(from_fn(security_headers))
        .layer(cors_layer(&state.config));

    Router::new()
        .nest(API_BASE_URI, unsplash_routes(&state.config))
        .layer(layers)
        .with_state(state)
}

/// 只允许配置的站点来源跨域访问
fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(&config.allowed_origin) {
        // list 模式只在请求来源匹配时返回 Access-Control-Allow-Origin
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(_) => {
            tracing::warn!(
                "Invalid SITE_URL {:?}, cross-origin requests will be refused",
                config.allowed_origin
            );
            cors
        }
    }
}
