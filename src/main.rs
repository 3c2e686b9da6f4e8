use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use storefront_gateway::{
    AppState,
    cache::sweeper::Sweepers,
    config::Config,
    router::{API_BASE_URI, create_router},
    upstream::{ImageSearchProvider, UnsplashClient},
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 凭证缺失时服务照常启动，但每个搜索请求都返回 500
    let provider: Option<Arc<dyn ImageSearchProvider>> = match &config.unsplash_access_key {
        Some(key) => {
            let client = UnsplashClient::new(&config.unsplash_api_url, key, config.upstream_timeout())
                .expect("Failed to build Unsplash HTTP client");
            Some(Arc::new(client))
        }
        None => {
            tracing::error!("UNSPLASH_ACCESS_KEY is not set; search requests will fail until it is configured");
            None
        }
    };

    // 设置应用状态
    let state = AppState::new(config, provider);

    // 启动后台清理任务
    let sweepers = Sweepers::start(
        state.cache.clone(),
        state.config.cache_sweep_interval(),
        state.limiter.clone(),
        state.config.rate_limit_sweep_interval(),
    );

    let app = create_router(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!(
        "Server listening on {} ({} requests per {} ms, cache TTL {} s)",
        addr,
        state.config.rate_limit_requests,
        state.config.rate_limit_window_ms,
        state.config.cache_ttl_secs
    );
    tracing::info!("Search endpoint: GET {}/search", API_BASE_URI);

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    // 停止清理任务并释放缓存
    sweepers.abort();
    state.cache.clear();
    state.limiter.clear();
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
