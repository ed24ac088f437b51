use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use crate::middlewares::proxy::ClientIp;
use crate::state::AppState;

// Requests whose client address could not be resolved share one bucket.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

/// Per-client token buckets.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: DashMap<IpAddr, Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    pub fn try_acquire(&self, key: IpAddr) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: IpAddr, now: Instant) -> bool {
        let RateLimitConfig { rps, burst } = self.config;
        let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            tokens: burst,
            last: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * rps).min(burst);
        bucket.last = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets idle for longer than `ttl`; returns how many were removed.
    pub fn purge_idle(&self, ttl: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last) < ttl);
        before - self.buckets.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Periodically evict idle buckets so the map does not grow without bound.
pub fn spawn_bucket_janitor(limiter: Arc<RateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = limiter.purge_idle(every);
            if removed > 0 {
                tracing::debug!(removed, "purged idle rate limiter buckets");
            }
        }
    })
}

pub async fn rate_limiter(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = req
        .extensions()
        .get::<ClientIp>()
        .map(|ClientIp(ip)| *ip)
        .unwrap_or(UNKNOWN_CLIENT);

    if state.rate_limiter.try_acquire(key) {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, "rate limit exceeded");
        ApiError::RateLimited.into_response()
    }
}
