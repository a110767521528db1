use crate::common::axum_ip::client_ip;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hashbrown::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

/// Sliding-window limit on message posts, per client address.
pub struct RateLimiter {
    window: Duration,
    max_messages: usize,
    posts: Mutex<Posts>,
}

#[derive(Default)]
struct Posts {
    by_address: HashMap<IpAddr, Vec<Instant>>,
    swept_at: Option<Instant>,
}

impl Posts {
    /// Drops every address without a post inside the window, at most once per window.
    fn sweep(&mut self, now: Instant, window: Duration) {
        if self
            .swept_at
            .is_some_and(|swept_at| now.saturating_duration_since(swept_at) < window)
        {
            return;
        }
        self.by_address.retain(|_, timestamps| {
            timestamps.retain(|posted_at| now.saturating_duration_since(*posted_at) < window);
            !timestamps.is_empty()
        });
        self.swept_at = Some(now);
    }
}

impl RateLimiter {
    pub fn new(window: Duration, max_messages: usize) -> Self {
        Self {
            window,
            max_messages,
            posts: Mutex::new(Posts::default()),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Records a post at `now` and returns `true`, or returns `false` without
    /// recording when `ip_addr` already posted `max_messages` times within the window.
    pub fn check(&self, ip_addr: IpAddr, now: Instant) -> bool {
        let mut posts = self.posts.lock().unwrap_or_else(PoisonError::into_inner);
        posts.sweep(now, self.window);
        let timestamps = posts.by_address.entry(ip_addr).or_default();
        timestamps.retain(|posted_at| now.saturating_duration_since(*posted_at) < self.window);
        if timestamps.len() >= self.max_messages {
            if timestamps.is_empty() {
                posts.by_address.remove(&ip_addr);
            }
            return false;
        }
        timestamps.push(now);
        true
    }

    #[cfg(test)]
    fn tracked_addresses(&self) -> usize {
        let posts = self.posts.lock().unwrap_or_else(PoisonError::into_inner);
        posts.by_address.len()
    }
}

pub fn counts_towards_limit(method: &Method, path: &str) -> bool {
    *method == Method::POST && path.contains("/messages")
}

pub fn rate_limited_message(max_messages: usize) -> String {
    format!("Rate limit exceeded: Only {max_messages} messages per minute allowed.")
}

pub async fn limit_message_posts(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if counts_towards_limit(request.method(), request.uri().path()) {
        let ip_addr = client_ip(request.headers(), request.extensions())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        if !limiter.check(ip_addr, Instant::now()) {
            warn!(%ip_addr, "Rate limit exceeded");
            let message = rate_limited_message(limiter.max_messages());
            return (StatusCode::FORBIDDEN, message).into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::post;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use tower::ServiceExt;

    const WINDOW: Duration = Duration::from_secs(60);

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([203, 0, 113, last])
    }

    #[test]
    fn sixth_post_within_a_minute_is_rejected() {
        let limiter = RateLimiter::new(WINDOW, 5);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check(ip(1), now));
        }
        assert!(!limiter.check(ip(1), now));
    }

    #[test]
    fn window_slide_readmits() {
        let limiter = RateLimiter::new(WINDOW, 5);
        let start = Instant::now();
        for second in 0..5 {
            assert!(limiter.check(ip(1), start + Duration::from_secs(second)));
        }
        assert!(!limiter.check(ip(1), start + Duration::from_secs(59)));
        // the first post is exactly one window old by now
        assert!(limiter.check(ip(1), start + WINDOW));
    }

    #[test]
    fn rejections_are_not_recorded() {
        let limiter = RateLimiter::new(WINDOW, 1);
        let start = Instant::now();
        assert!(limiter.check(ip(1), start));
        assert!(!limiter.check(ip(1), start + Duration::from_secs(30)));
        assert!(limiter.check(ip(1), start + WINDOW));
    }

    #[test]
    fn addresses_are_limited_independently() {
        let limiter = RateLimiter::new(WINDOW, 5);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check(ip(1), now));
        }
        assert!(limiter.check(ip(2), now));
    }

    #[test]
    fn idle_addresses_are_forgotten_after_a_window() {
        let limiter = RateLimiter::new(WINDOW, 5);
        let start = Instant::now();
        for n in 0..10_000u32 {
            assert!(limiter.check(IpAddr::from(n.to_be_bytes()), start));
        }
        assert_eq!(limiter.tracked_addresses(), 10_000);

        assert!(limiter.check(ip(1), start + WINDOW * 10));
        assert_eq!(limiter.tracked_addresses(), 1);
    }

    #[test]
    fn active_addresses_survive_a_sweep() {
        let limiter = RateLimiter::new(WINDOW, 2);
        let start = Instant::now();
        assert!(limiter.check(ip(1), start));
        assert!(limiter.check(ip(2), start + Duration::from_secs(30)));
        assert!(limiter.check(ip(3), start + WINDOW + Duration::from_secs(1)));
        assert_eq!(limiter.tracked_addresses(), 2);
        assert!(limiter.check(ip(2), start + WINDOW + Duration::from_secs(2)));
        assert!(!limiter.check(ip(2), start + WINDOW + Duration::from_secs(3)));
    }

    #[test]
    fn zero_limit_keeps_no_entries() {
        let limiter = RateLimiter::new(WINDOW, 0);
        assert!(!limiter.check(ip(1), Instant::now()));
        assert_eq!(limiter.tracked_addresses(), 0);
    }

    #[rstest]
    #[case(Method::POST, "/api/messages/", true)]
    #[case(Method::POST, "/api/conversations/7/messages/", true)]
    #[case(Method::GET, "/api/messages/", false)]
    #[case(Method::PUT, "/api/messages/7", false)]
    #[case(Method::POST, "/api/conversations/", false)]
    fn only_message_posts_count(
        #[case] method: Method,
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(counts_towards_limit(&method, path), expected);
    }

    fn app(limiter: Arc<RateLimiter>) -> Router {
        Router::new()
            .route("/api/messages/", post(|| async { "sent" }).get(|| async { "listed" }))
            .layer(axum::middleware::from_fn_with_state(limiter, limit_message_posts))
    }

    fn request(method: Method, forwarded_for: &str) -> Request {
        Request::builder()
            .method(method)
            .uri("/api/messages/")
            .header("X-Forwarded-For", forwarded_for)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_over_the_limit_with_forbidden() {
        let app = app(Arc::new(RateLimiter::new(WINDOW, 5)));
        for _ in 0..5 {
            let response = app
                .clone()
                .oneshot(request(Method::POST, "198.51.100.4"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(request(Method::POST, "198.51.100.4, 10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            body,
            "Rate limit exceeded: Only 5 messages per minute allowed.".as_bytes()
        );

        let response = app
            .clone()
            .oneshot(request(Method::GET, "198.51.100.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::POST, "198.51.100.5"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
