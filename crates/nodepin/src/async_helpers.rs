use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

pub(crate) async fn run_with_timeout<T, E, F, M>(
    timeout: Duration,
    timeout_operation: &'static str,
    future: F,
    map_error: M,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    M: FnOnce(E) -> AppError,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(map_error(error)),
        Err(_) => Err(AppError::timeout(timeout_operation, timeout.as_secs())),
    }
}

/// Like [`run_with_timeout`], but waits indefinitely when `timeout` is `None`.
pub(crate) async fn run_with_optional_timeout<T, E, F, M>(
    timeout: Option<Duration>,
    timeout_operation: &'static str,
    future: F,
    map_error: M,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, E>>,
    M: FnOnce(E) -> AppError,
{
    match timeout {
        Some(timeout) => run_with_timeout(timeout, timeout_operation, future, map_error).await,
        None => future.await.map_err(map_error),
    }
}
