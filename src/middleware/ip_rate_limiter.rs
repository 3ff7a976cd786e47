/// Per-IP sliding window limiter for the public submission endpoints.
///
/// In-memory, single instance. Clients are keyed on the same IP derivation
/// used when persisting inquiries (first `X-Forwarded-For` entry, else peer).

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::time::sleep;

use crate::middleware::error_handling::AppError;
use crate::state::AppState;
use crate::utils::client_ip::{client_ip, peer_addr};

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    /// `per_minute` submissions per client per minute
    pub fn submissions(per_minute: u32) -> Self {
        Self {
            max_requests: per_minute,
            window: Duration::from_secs(60),
        }
    }
}

struct IpTracker {
    requests: Vec<Instant>,
    last_seen: Instant,
}

impl IpTracker {
    fn new() -> Self {
        Self {
            requests: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    /// Drop expired timestamps, then record this request if under the limit
    fn check_limit(&mut self, config: &RateLimitConfig) -> bool {
        let now = Instant::now();
        self.requests.retain(|&at| now.duration_since(at) < config.window);
        self.last_seen = now;

        if self.requests.len() >= config.max_requests as usize {
            return false;
        }

        self.requests.push(now);
        true
    }

    /// Whole seconds until the oldest request leaves the window, at least 1
    fn retry_after(&self, config: &RateLimitConfig) -> u64 {
        match self.requests.first() {
            Some(&oldest) => {
                let remaining = config.window.saturating_sub(Instant::now().duration_since(oldest));
                let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                secs.max(1)
            }
            None => 1,
        }
    }
}

pub struct RateLimiter {
    trackers: Arc<DashMap<String, IpTracker>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let limiter = Self {
            trackers: Arc::new(DashMap::new()),
            config,
        };

        // Idle trackers are swept every 5 minutes when running under tokio
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let trackers = Arc::downgrade(&limiter.trackers);
            let idle_after = limiter.config.window * 2;
            handle.spawn(async move {
                loop {
                    sleep(Duration::from_secs(300)).await;
                    let Some(trackers) = trackers.upgrade() else {
                        break;
                    };
                    trackers.retain(|_, tracker| tracker.last_seen.elapsed() < idle_after);
                }
            });
        }

        limiter
    }

    /// `Err(retry_after_secs)` when the client is over the limit
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let mut entry = self
            .trackers
            .entry(client.to_string())
            .or_insert_with(IpTracker::new);

        if entry.check_limit(&self.config) {
            Ok(())
        } else {
            Err(entry.retry_after(&self.config))
        }
    }
}

pub async fn submission_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(request.headers(), peer_addr(request.extensions()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.submission_limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            tracing::warn!("Submission rate limit exceeded for IP: {}", client);
            let mut response = AppError::TooManyRequests(format!(
                "Too many submissions. Try again in {} seconds.",
                retry_after
            ))
            .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
