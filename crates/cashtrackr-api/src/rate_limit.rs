// Rate limiting for account endpoints
// Decision: Fixed window counter per client, kept in a DashMap
// Decision: Client key is the socket peer address; X-Forwarded-For is read only when
// trust_proxy is set, and then only its right-most entry (the one our proxy appended)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use crate::config::RateLimitConfig;
use crate::error::ApiError;

pub const RATE_LIMIT_MESSAGE: &str = "Haz Alcanzado el Limite de Peticiones";

/// Per-client request counter for the current window
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed {
        /// Requests left in the current window
        remaining: u32,
    },
    Denied {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Count one request for `client_key`
    pub fn check(&self, client_key: &str) -> RateLimitResult {
        self.check_at(client_key, Instant::now())
    }

    fn check_at(&self, client_key: &str, now: Instant) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::Allowed {
                remaining: u32::MAX,
            };
        }

        let window_len = self.config.window();
        let mut window = self
            .windows
            .entry(client_key.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.config.max_requests {
            let elapsed = now.duration_since(window.started);
            return RateLimitResult::Denied {
                retry_after: window_len.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - window.count,
        }
    }

    /// Drop windows that have already expired
    pub fn cleanup(&self) {
        let now = Instant::now();
        let window_len = self.config.window();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < window_len);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self) -> Duration {
        self.config.window()
    }
}

/// Periodically purge expired windows
pub fn spawn_cleanup(limiter: Arc<RateLimiter>) -> tokio::task::JoinHandle<()> {
    let period = limiter.window().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            limiter.cleanup();
            tracing::trace!(clients = limiter.tracked_clients(), "Rate limit windows purged");
        }
    })
}

/// Middleware: reject with 429 once a client exhausts its window
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_key = client_key(request.headers(), peer, limiter.config.trust_proxy);

    match limiter.check(&client_key) {
        RateLimitResult::Allowed { remaining } => {
            let mut response = next.run(request).await;
            if limiter.config.enabled {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
            }
            response
        }
        RateLimitResult::Denied { retry_after } => {
            tracing::warn!(client = %client_key, "Rate limit exceeded");
            let mut response =
                ApiError::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()).into_response();
            // Round up so clients never retry early
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(secs.max(1)));
            response
        }
    }
}

/// Key identifying the caller
fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get_all("X-Forwarded-For")
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|s| s.split(','))
            .last()
            .and_then(|s| s.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs: 60,
            trust_proxy: false,
        })
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = limiter(2);
        assert_eq!(
            limiter.check("client1"),
            RateLimitResult::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check("client1"),
            RateLimitResult::Allowed { remaining: 0 }
        );
        assert!(matches!(
            limiter.check("client1"),
            RateLimitResult::Denied { .. }
        ));
    }

    #[test]
    fn test_separate_clients() {
        let limiter = limiter(1);
        assert!(matches!(limiter.check("a"), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check("b"), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check("a"), RateLimitResult::Denied { .. }));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1);
        let start = Instant::now();
        assert!(matches!(
            limiter.check_at("a", start),
            RateLimitResult::Allowed { .. }
        ));
        match limiter.check_at("a", start + Duration::from_secs(20)) {
            RateLimitResult::Denied { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40))
            }
            other => panic!("expected denial, got {:?}", other),
        }
        assert!(matches!(
            limiter.check_at("a", start + Duration::from_secs(60)),
            RateLimitResult::Allowed { .. }
        ));
    }

    #[test]
    fn test_disabled() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_secs: 60,
            trust_proxy: false,
        });
        for _ in 0..50 {
            assert!(matches!(limiter.check("a"), RateLimitResult::Allowed { .. }));
        }
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_client_key_uses_peer_by_default() {
        let mut headers = HeaderMap::new();
        let peer: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer), false), "10.0.0.1");
        assert_eq!(client_key(&headers, None, false), "unknown");

        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.2"),
        );
        assert_eq!(client_key(&headers, Some(peer), false), "10.0.0.1");
        assert_eq!(client_key(&headers, None, false), "unknown");
    }

    #[test]
    fn test_client_key_behind_proxy() {
        let mut headers = HeaderMap::new();
        let peer: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.1");

        // Callers can prepend anything; the proxy appends the real address last
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("198.51.100.99, 203.0.113.7"),
        );
        assert_eq!(client_key(&headers, Some(peer), true), "203.0.113.7");

        headers.append("X-Forwarded-For", HeaderValue::from_static("192.0.2.4"));
        assert_eq!(client_key(&headers, Some(peer), true), "192.0.2.4");

        headers.insert("X-Forwarded-For", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_key(&headers, Some(peer), true), "10.0.0.1");
    }
}
