use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::operations::{RateLimiter, TtlCache};

/// 后台清理任务句柄，drop 时不会停止任务，需要显式 `abort`
pub struct Sweepers {
    handles: Vec<JoinHandle<()>>,
}

impl Sweepers {
    pub fn start<V>(
        cache: Arc<TtlCache<V>>,
        cache_every: Duration,
        limiter: Arc<RateLimiter>,
        limiter_every: Duration,
    ) -> Self
    where
        V: Send + Sync + 'static,
    {
        let cache_task = spawn_periodic("Cache", cache_every, move || cache.sweep());
        let limiter_task = spawn_periodic("RateLimit", limiter_every, move || limiter.sweep());
        Self {
            handles: vec![cache_task, limiter_task],
        }
    }

    pub fn abort(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}

/// 按固定周期执行 `sweep`，首次执行在一个周期之后
pub fn spawn_periodic<F>(label: &'static str, every: Duration, sweep: F) -> JoinHandle<()>
where
    F: Fn() -> usize + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = sweep();
            if removed > 0 {
                tracing::info!("[{}] Cleaned up {} expired entries", label, removed);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_schedule() {
        let cache = Arc::new(TtlCache::new());
        let limiter = Arc::new(RateLimiter::new());
        cache.set("k", 1, Duration::from_secs(1));
        limiter.check("ip", 10, Duration::from_secs(1));

        let sweepers = Sweepers::start(
            cache.clone(),
            Duration::from_secs(300),
            limiter.clone(),
            Duration::from_secs(60),
        );

        // 过期但尚未清理
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(limiter.stats().active_identifiers, 1);

        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(limiter.stats().active_identifiers, 0);
        assert_eq!(cache.len(), 1);

        time::sleep(Duration::from_secs(240)).await;
        assert!(cache.is_empty());

        sweepers.abort();
    }
}
