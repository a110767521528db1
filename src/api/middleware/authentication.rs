use crate::common::error::AppError;
use crate::common::state::AppState;
use crate::models::sessions::Session;
use crate::usecases::sessions;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

/// The session uuid carried by `Authorization: Bearer <uuid>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?;
    Uuid::parse_str(token.trim()).ok()
}

/// Resolves the bearer token to a session and attaches it to the request.
/// Requests without a live session continue anonymously.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(session_id) = bearer_token(request.headers()) {
        match sessions::fetch_one(&state, session_id, state.session_timeout).await {
            Ok(session) => match sessions::extend(&state, session).await {
                Ok(session) => {
                    request.extensions_mut().insert(session);
                }
                Err(e) => return e.into_response(),
            },
            Err(AppError::SessionsNotFound) => {}
            Err(e) => return e.into_response(),
        }
    }
    next.run(request).await
}

/// Extracts the caller's session, rejecting anonymous requests.
pub struct CurrentSession(pub Session);

impl<S: Sync + Send> FromRequestParts<S> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(CurrentSession(session.clone())),
            None => Err(AppError::Unauthorized),
        }
    }
}
