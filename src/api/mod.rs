use crate::common::axum_ip::IpAddrInfo;
use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::redis_pool::{PoolResult, RedisPool};
use crate::common::state::AppState;
use crate::settings::AppSettings;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use sqlx::{MySql, Pool};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub mod auth;
pub mod conversations;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod users;

use middleware::{access_window, authentication, rate_limit, request_log, role_permission};

pub struct RequestContext {
    pub db: Pool<MySql>,
    pub redis: RedisPool,
    pub request_ip: IpAddrInfo,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip_info = IpAddrInfo::from_request_parts(parts, state).await?;
        Ok(Self {
            db: state.db.clone(),
            redis: state.redis.clone(),
            request_ip: ip_info,
        })
    }
}

#[async_trait]
impl Context for RequestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    async fn redis(&self) -> PoolResult {
        self.redis.get().await
    }
}

/// A JSON request body, rejected as [`AppError::DecodingRequestFailed`].
pub struct JsonBody<T>(pub T);

impl<S: Sync + Send, T: DeserializeOwned> FromRequest<S> for JsonBody<T> {
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(e) => {
                warn!("Failed to decode request body: {e}");
                Err(AppError::DecodingRequestFailed)
            }
        }
    }
}

/// Path parameters, rejected as [`AppError::DecodingRequestFailed`].
pub struct PathArgs<T>(pub T);

impl<S: Sync + Send, T: DeserializeOwned + Send> FromRequestParts<S> for PathArgs<T> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathArgs(value)),
            Err(e) => {
                warn!("Failed to decode path parameters: {e}");
                Err(AppError::DecodingRequestFailed)
            }
        }
    }
}

/// Query string arguments, rejected as [`AppError::DecodingRequestFailed`].
pub struct QueryArgs<T>(pub T);

impl<S: Sync + Send, T: DeserializeOwned> FromRequestParts<S> for QueryArgs<T> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryArgs(value)),
            Err(e) => {
                warn!("Failed to decode query string: {e}");
                Err(AppError::DecodingRequestFailed)
            }
        }
    }
}

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users", post(users::register))
        .route("/api/users/", post(users::register))
        .route("/api/users/me", get(users::me).delete(users::delete_account))
        .route("/api/users/me/delete", post(users::delete_account))
        .route(
            "/api/conversations",
            get(conversations::list).post(conversations::create),
        )
        .route(
            "/api/conversations/",
            get(conversations::list).post(conversations::create),
        )
        .route(
            "/api/conversations/{conversation_id}",
            get(conversations::retrieve)
                .put(conversations::update)
                .patch(conversations::update)
                .delete(conversations::delete),
        )
        .route(
            "/api/conversations/{conversation_id}/messages",
            get(messages::list_in_conversation).post(messages::create_in_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/messages/",
            get(messages::list_in_conversation).post(messages::create_in_conversation),
        )
        .route(
            "/api/conversations/{conversation_id}/messages/{message_id}",
            get(messages::retrieve_in_conversation)
                .put(messages::update_in_conversation)
                .patch(messages::update_in_conversation)
                .delete(messages::delete_in_conversation),
        )
        .route("/api/messages", get(messages::list).post(messages::create))
        .route("/api/messages/", get(messages::list).post(messages::create))
        .route("/api/messages/unread", get(messages::unread))
        .route("/api/messages/inbox", get(messages::inbox))
        .route(
            "/api/messages/{message_id}",
            get(messages::retrieve)
                .put(messages::update)
                .patch(messages::update)
                .delete(messages::delete),
        )
        .route("/api/messages/{message_id}/thread", get(messages::thread))
        .route("/api/messages/{message_id}/history", get(messages::history))
        .route("/api/messages/{message_id}/read", post(messages::mark_read))
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/", get(notifications::list))
        .route(
            "/api/notifications/{notification_id}/read",
            post(notifications::mark_read),
        )
        // layers run bottom to top: the last one added sees the request first
        .layer(from_fn(role_permission::require_privileged_role))
        .layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit::limit_message_posts,
        ))
        .layer(from_fn_with_state(
            state.access_window,
            access_window::restrict_access_window,
        ))
        .layer(from_fn(request_log::log_request))
        .layer(from_fn_with_state(
            state.clone(),
            authentication::authenticate,
        ))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(api_router(&state))
        .with_state(state)
}

pub async fn index() -> &'static str {
    "Running messaging-service v0.1"
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let app = router(state);

    let addr = SocketAddr::new(settings.app_host, settings.app_port);
    let listener = TcpListener::bind(addr).await?;
    info!("Serving API on {addr}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("API shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::access_window::{AccessWindow, RESTRICTED_MESSAGE};
    use crate::api::middleware::rate_limit::RateLimiter;
    use crate::common::testing::offline_state;
    use crate::models::pagination::PageArgs;
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::net::IpAddr;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;
    use uuid::Uuid;

    const OPEN: AccessWindow = AccessWindow {
        enabled: false,
        start_hour: 18,
        end_hour: 21,
    };
    const CLOSED: AccessWindow = AccessWindow {
        enabled: true,
        start_hour: 0,
        end_hour: 0,
    };
    const CLIENT: &str = "198.51.100.7";

    fn post_message() -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/api/messages/")
            .header("X-Forwarded-For", CLIENT)
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"conversation":"00000000-0000-0000-0000-000000000001","message_body":"hi"}"#))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> axum::body::Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn anonymous_message_posts_are_counted_before_the_role_gate() {
        let state = offline_state(OPEN, RateLimiter::new(Duration::from_secs(60), 1));
        let app = router(state);

        let response = app.clone().oneshot(post_message()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({ "error": "Authentication required" }));

        let response = app.oneshot(post_message()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_bytes(response).await,
            "Rate limit exceeded: Only 1 messages per minute allowed.".as_bytes()
        );
    }

    #[tokio::test]
    async fn closed_window_rejects_before_rate_limiting() {
        let state = offline_state(CLOSED, RateLimiter::new(Duration::from_secs(60), 1));
        let limiter = state.rate_limiter.clone();
        let app = router(state);

        let response = app.oneshot(post_message()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_bytes(response).await, RESTRICTED_MESSAGE.as_bytes());

        let client: IpAddr = CLIENT.parse().unwrap();
        assert!(limiter.check(client, Instant::now()));
    }

    #[tokio::test]
    async fn index_is_outside_the_api_middleware() {
        let state = offline_state(CLOSED, RateLimiter::new(Duration::from_secs(60), 1));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn decoding_app() -> Router {
        Router::new().route(
            "/items/{item_id}",
            get(
                |PathArgs(item_id): PathArgs<Uuid>, QueryArgs(page): QueryArgs<PageArgs>| async move {
                    format!("{item_id} {}", page.offset())
                },
            ),
        )
    }

    #[rstest::rstest]
    #[case("/items/not-a-uuid")]
    #[case("/items/00000000-0000-0000-0000-000000000001?page=abc")]
    #[tokio::test]
    async fn malformed_parameters_use_the_error_body(#[case] uri: &str) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = decoding_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["code"], "decoding_request_failed");
    }

    #[tokio::test]
    async fn well_formed_parameters_pass_through() {
        let request = Request::builder()
            .uri("/items/00000000-0000-0000-0000-000000000001?page=2&page_size=10")
            .body(Body::empty())
            .unwrap();
        let response = decoding_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
