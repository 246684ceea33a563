//! Per-client rate limiting backed by keyed `governor` limiters.
//!
//! Clients are keyed by the socket peer address, which needs the server to
//! run with `into_make_service_with_connect_info::<SocketAddr>()`. Forwarded
//! headers are client-controlled and never used as a key. Requests without
//! connect info share one bucket.
//!
//! Keys stay in the limiter until [`RateLimiters::prune`] drops the ones
//! whose bucket has refilled; [`RateLimiters::spawn_pruner`] does that on a
//! timer.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use openlms_config::RateLimitConfig;
use openlms_core::AppError;

use crate::metrics::track_rate_limited;
use crate::state::AppState;

pub type KeyedLimiter = DefaultKeyedRateLimiter<String>;

const UNKNOWN_PEER: &str = "unknown";

#[derive(Clone)]
pub struct RateLimiters {
    pub general: Arc<KeyedLimiter>,
    pub auth: Arc<KeyedLimiter>,
}

fn keyed_limiter(per_second: u32, burst_size: u32) -> KeyedLimiter {
    let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    let burst_size = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
    RateLimiter::keyed(Quota::per_second(per_second).allow_burst(burst_size))
}

impl RateLimiters {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            general: Arc::new(keyed_limiter(
                config.general_per_second,
                config.general_burst_size,
            )),
            auth: Arc::new(keyed_limiter(config.auth_per_second, config.auth_burst_size)),
        }
    }

    /// Number of clients currently tracked across both limiters.
    pub fn tracked_keys(&self) -> usize {
        self.general.len() + self.auth.len()
    }

    /// Forgets clients whose buckets are full again.
    pub fn prune(&self) {
        for limiter in [&self.general, &self.auth] {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Prunes both limiters every `every` on the current runtime.
    pub fn spawn_pruner(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiters = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                limiters.prune();
                tracing::debug!(tracked = limiters.tracked_keys(), "rate limiter pruned");
            }
        })
    }
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_PEER.to_string())
}

fn check(limiter: &KeyedLimiter, scope: &'static str, req: &Request) -> Result<(), AppError> {
    let key = client_key(req);
    limiter.check_key(&key).map_err(|_| {
        tracing::warn!(client = %key, scope, "rate limit exceeded");
        track_rate_limited(scope);
        AppError::too_many_requests("Too many requests, please slow down")
    })
}

pub async fn general_rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.rate_limiters.general, "general", &req)?;
    Ok(next.run(req).await)
}

pub async fn auth_rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.rate_limiters.auth, "auth", &req)?;
    Ok(next.run(req).await)
}
