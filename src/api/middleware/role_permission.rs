use crate::models::sessions::Session;
use axum::Json;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

const RESTRICTED_PATHS: [&str; 2] = ["/api/messages", "/api/conversations"];

/// Writes to the message and conversation collections, with or without the trailing slash.
pub fn is_restricted(method: &Method, path: &str) -> bool {
    let path = path.strip_suffix('/').unwrap_or(path);
    matches!(*method, Method::POST | Method::PUT | Method::DELETE) && RESTRICTED_PATHS.contains(&path)
}

fn reject(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

pub async fn require_privileged_role(request: Request, next: Next) -> Response {
    if is_restricted(request.method(), request.uri().path()) {
        match request.extensions().get::<Session>() {
            None => return reject(StatusCode::UNAUTHORIZED, "Authentication required"),
            Some(session) if !session.role.is_privileged() => {
                return reject(
                    StatusCode::FORBIDDEN,
                    "Forbidden: insufficient role permissions",
                );
            }
            Some(_) => {}
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;
    use axum::Router;
    use axum::body::Body;
    use axum::routing::post;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use std::net::IpAddr;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[rstest]
    #[case(Method::POST, "/api/messages/", true)]
    #[case(Method::POST, "/api/messages", true)]
    #[case(Method::PUT, "/api/conversations/", true)]
    #[case(Method::DELETE, "/api/conversations/", true)]
    #[case(Method::GET, "/api/messages/", false)]
    #[case(Method::PATCH, "/api/messages/", false)]
    #[case(Method::POST, "/api/messages/unread", false)]
    #[case(Method::POST, "/api/conversations/7/messages/", false)]
    fn restricts_collection_writes(
        #[case] method: Method,
        #[case] path: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_restricted(&method, path), expected);
    }

    fn session(role: Role) -> Session {
        Session {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role,
            create_ip_address: IpAddr::from([127, 0, 0, 1]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn app(role: Option<Role>) -> Router {
        Router::new()
            .route("/api/messages/", post(|| async { "created" }))
            .layer(axum::middleware::from_fn(require_privileged_role))
            .layer(axum::middleware::from_fn(
                move |mut request: Request, next: Next| async move {
                    if let Some(role) = role {
                        request.extensions_mut().insert(session(role));
                    }
                    next.run(request).await
                },
            ))
    }

    async fn post_message(role: Option<Role>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/messages/")
            .body(Body::empty())
            .unwrap();
        let response = app(role).oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn anonymous_users_must_authenticate() {
        let (status, body) = post_message(None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"Authentication required"}"#);
    }

    #[rstest]
    #[case(Role::Guest)]
    #[case(Role::Host)]
    #[tokio::test]
    async fn unprivileged_roles_are_forbidden(#[case] role: Role) {
        let (status, body) = post_message(Some(role)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, r#"{"error":"Forbidden: insufficient role permissions"}"#);
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Moderator)]
    #[tokio::test]
    async fn privileged_roles_pass(#[case] role: Role) {
        let (status, body) = post_message(Some(role)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "created");
    }
}
