use crate::common::error::ServiceResult;
use crate::common::state::AppState;
use crate::usecases::sessions;
use tracing::{error, info};

/// Removes sessions idle for longer than the session timeout. Returns how many went.
pub async fn cleanup_sessions(ctx: &AppState) -> ServiceResult<usize> {
    let active_sessions = sessions::fetch_all(ctx).await?;
    let timed_out = active_sessions.filter(|session| session.is_expired(ctx.session_timeout));
    let mut removed = 0;
    for session in timed_out {
        info!(
            session_id = %session.session_id,
            user_id = %session.user_id,
            "Session timed out..."
        );
        match sessions::delete(ctx, &session).await {
            Ok(()) => removed += 1,
            Err(e) => error!(
                session_id = %session.session_id,
                user_id = %session.user_id,
                "Failed to time out session: {e:?}",
            ),
        }
    }
    Ok(removed)
}
