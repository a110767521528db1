use std::fmt::Display;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs `op` until it succeeds, at most `retries` times (at least once),
/// sleeping `delay` after every failed attempt but the last.
pub async fn retry_on_failure<T, E, F, Fut>(retries: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = retries.max(1);
    let mut attempt = 1;
    loop {
        info!(attempt, attempts, "Attempting operation");
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                error!(attempts, "All retries failed: {e}");
                return Err(e);
            }
            Err(e) => {
                warn!(attempt, "Attempt failed, retrying in {delay:?}: {e}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_first_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, String> = retry_on_failure(3, Duration::ZERO, move || async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call < 2 { Err(format!("attempt {call} failed")) } else { Ok(call) }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_with_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = retry_on_failure(3, Duration::ZERO, move || async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err(format!("attempt {call} failed"))
        })
        .await;

        assert_eq!(result, Err("attempt 3 failed".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_still_attempts_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _: Result<(), &str> = retry_on_failure(0, Duration::ZERO, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down")
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
