use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::services::cache_service::CacheService;

const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

impl WindowState {
    fn fresh(now: Instant) -> Self {
        Self { start: now, count: 0 }
    }

    /// Counts one request in a fixed window; `false` once `limit` is exceeded.
    fn hit(&mut self, now: Instant, window: Duration, limit: u32) -> bool {
        if now.duration_since(self.start) >= window {
            self.start = now;
            self.count = 0;
        }
        if self.count < limit {
            self.count += 1;
            true
        } else {
            false
        }
    }
}

/// Global requests-per-second guard shared by every caller.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    window: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            window: Arc::new(Mutex::new(WindowState::fresh(Instant::now()))),
        }
    }

    fn allow(&self) -> bool {
        let mut guard = self.window.lock().expect("rate limiter mutex poisoned");
        guard.hit(Instant::now(), Duration::from_secs(1), self.rps)
    }
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}

/// Per-client fixed window. Counted in Redis when available, otherwise in
/// this process only.
#[derive(Clone)]
pub struct ClientRateLimiter {
    cache: CacheService,
    max_requests: u32,
    window: Duration,
    capacity: usize,
    local: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl ClientRateLimiter {
    pub fn new(cache: CacheService, max_requests: u32, window: Duration) -> Self {
        Self {
            cache,
            max_requests: max_requests.max(1),
            window: window.max(Duration::from_secs(1)),
            capacity: MAX_TRACKED_CLIENTS,
            local: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn allow(&self, client: &str) -> bool {
        let shared = self
            .cache
            .check_rate_limit(
                client,
                i64::from(self.max_requests),
                self.window.as_secs() as i64,
            )
            .await;
        match shared {
            Some(allowed) => allowed,
            None => self.allow_local(client),
        }
    }

    fn allow_local(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.local.lock().expect("rate limiter mutex poisoned");
        if clients.len() >= self.capacity && !clients.contains_key(client) {
            let window = self.window;
            clients.retain(|_, state| now.duration_since(state.start) < window);
            // All windows live: drop the oldest to stay bounded.
            while clients.len() >= self.capacity {
                let oldest = clients
                    .iter()
                    .min_by_key(|(_, state)| state.start)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(key) => {
                        clients.remove(&key);
                    }
                    None => break,
                }
            }
        }
        clients
            .entry(client.to_string())
            .or_insert_with(|| WindowState::fresh(now))
            .hit(now, self.window, self.max_requests)
    }
}

/// First `x-forwarded-for` hop, or `unknown`.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub async fn client_rate_middleware(
    State(limiter): State<ClientRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(req.headers());
    if !limiter.allow(&client).await {
        tracing::warn!(client = %client, "Client rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests, please try again later." })),
        )
            .into_response();
    }
    next.run(req).await
}
