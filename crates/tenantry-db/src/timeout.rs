//! Bounded store calls.

use std::time::Duration;

use crate::error::DbError;

/// Bound applied to each store call unless configured otherwise.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a store call, failing with [`DbError::Timeout`] once `limit`
/// elapses. A timed-out call is abandoned, not retried.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(DbError::Timeout {
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
