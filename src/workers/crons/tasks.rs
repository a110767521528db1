/// Runs each task against `$ctx` in order, logging its outcome.
/// Evaluates to the names of the tasks that failed.
#[macro_export]
macro_rules! cron_tasks {
    ($ctx:expr, $($t:path),* $(,)?) => {{
        let mut failed_tasks: Vec<&'static str> = vec![];
        $({
            const TASK_NAME: &str = const_str::convert_ascii_case!(upper_camel, stringify!($t));
            let started_at = std::time::Instant::now();
            tracing::info!(task = TASK_NAME, "Starting task");
            match ($t)($ctx).await {
                Ok(result) => tracing::info!(
                    task = TASK_NAME,
                    elapsed = ?started_at.elapsed(),
                    "Completed task with result {result:?}"
                ),
                Err(e) => {
                    tracing::error!(task = TASK_NAME, "Task failed: {e:?}");
                    failed_tasks.push(TASK_NAME);
                }
            }
        })*
        failed_tasks
    }};
}
