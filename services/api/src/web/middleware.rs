//! services/api/src/web/middleware.rs
//!
//! Admin authentication and per-IP rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::web::state::AppState;

const API_KEY_HEADER: &str = "x-api-key";

//=========================================================================================
// Admin Authentication
//=========================================================================================

/// Middleware that validates the `X-API-Key` header against the configured
/// admin key.
///
/// A missing header returns 401 Unauthorized; a wrong key returns 403
/// Forbidden.
pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !constant_time_eq(presented.as_bytes(), state.config.admin_api_key.as_bytes()) {
        warn!("rejected admin request with invalid api key");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(req).await)
}

/// Byte-fold comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//=========================================================================================
// Per-IP Rate Limiting
//=========================================================================================

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window per-IP rate limiter. Windows reset lazily on the next
/// request; `sweep` drops entries whose window has long expired.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Returns whether the request is allowed and counts it if so.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = windows.entry(ip).or_insert(Window {
            started_at: now,
            count: 0,
        });
        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }
        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drops idle entries. Run periodically from a background task.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window * 2);
    }
}

/// Middleware applying the shared rate limiter to the connecting address.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !state.rate_limiter.check(addr.ip()) {
        warn!(ip = %addr.ip(), "rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn limits_within_a_window_per_ip() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at(ip(1), start));
        }
        assert!(!limiter.check_at(ip(1), start));
        // Another client is unaffected.
        assert!(limiter.check_at(ip(2), start));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at(ip(1), start));
        assert!(!limiter.check_at(ip(1), start + Duration::from_secs(59)));
        assert!(limiter.check_at(ip(1), start + Duration::from_secs(60)));
    }

    #[test]
    fn constant_time_eq_matches_exactly() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secre"));
    }
}
