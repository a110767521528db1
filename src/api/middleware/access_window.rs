use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Local, Timelike};

pub const RESTRICTED_MESSAGE: &str = "Access to chat is restricted during this time.";

/// Local hours `[start_hour, end_hour)` during which the chat is open.
#[derive(Debug, Copy, Clone)]
pub struct AccessWindow {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl AccessWindow {
    pub fn allows(&self, hour: u32) -> bool {
        !self.enabled || (self.start_hour..self.end_hour).contains(&hour)
    }
}

pub async fn restrict_access_window(
    State(window): State<AccessWindow>,
    request: Request,
    next: Next,
) -> Response {
    let hour = Local::now().hour();
    if !window.allows(hour) {
        return (StatusCode::FORBIDDEN, RESTRICTED_MESSAGE).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use tower::ServiceExt;

    const EVENING: AccessWindow = AccessWindow {
        enabled: true,
        start_hour: 18,
        end_hour: 21,
    };

    #[rstest]
    #[case(17, false)]
    #[case(18, true)]
    #[case(19, true)]
    #[case(20, true)]
    #[case(21, false)]
    #[case(0, false)]
    fn opens_only_within_the_window(#[case] hour: u32, #[case] allowed: bool) {
        assert_eq!(EVENING.allows(hour), allowed);
    }

    #[test]
    fn disabled_window_allows_every_hour() {
        let window = AccessWindow {
            enabled: false,
            ..EVENING
        };
        assert!((0..24).all(|hour| window.allows(hour)));
    }

    fn app(window: AccessWindow) -> Router {
        Router::new()
            .route("/api/messages/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(window, restrict_access_window))
    }

    fn request() -> Request {
        Request::builder()
            .uri("/api/messages/")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn closed_window_rejects_requests() {
        let closed = AccessWindow {
            enabled: true,
            start_hour: 0,
            end_hour: 0,
        };
        let response = app(closed).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, RESTRICTED_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn open_window_passes_requests_through() {
        let always_open = AccessWindow {
            enabled: true,
            start_hour: 0,
            end_hour: 24,
        };
        let response = app(always_open).oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
