use crate::models::sessions::Session;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Local};
use tracing::info;

/// Events on this target end up in the request log file.
pub const REQUEST_LOG_TARGET: &str = "requests";

pub fn format_log_line(timestamp: DateTime<Local>, user: Option<&str>, path: &str) -> String {
    let user = user.unwrap_or("Anonymous");
    let timestamp = timestamp.format("%Y-%m-%d %H:%M:%S%.6f");
    format!("{timestamp} - User: {user} - Path: {path}")
}

pub async fn log_request(request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<Session>()
        .map(|session| session.email.as_str());
    let line = format_log_line(Local::now(), user, request.uri().path());
    info!(target: REQUEST_LOG_TARGET, "{line}");
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_authenticated_requests() {
        let timestamp = Local.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap();
        let line = format_log_line(timestamp, Some("ada@example.com"), "/api/messages/");
        assert_eq!(
            line,
            "2024-05-01 18:30:00.000000 - User: ada@example.com - Path: /api/messages/"
        );
    }

    #[test]
    fn anonymous_requests_are_labelled() {
        let timestamp = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let line = format_log_line(timestamp, None, "/api/auth/login");
        assert!(line.ends_with(" - User: Anonymous - Path: /api/auth/login"));
    }
}
