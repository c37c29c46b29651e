//! Bounded waits on database round trips.

use std::future::Future;
use std::time::Duration;

/// How long `/health` waits for the probe query
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    #[error("No answer from the database within {0:?}")]
    Elapsed(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Await a query, giving up once `limit` has passed.
///
/// ```no_run
/// use std::time::Duration;
/// use tennis_tournament::db::timeouts::with_timeout;
/// # async fn probe(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let row_count = with_timeout(
///     Duration::from_millis(500),
///     sqlx::query("SELECT 1").execute(pool),
/// )
/// .await?
/// .rows_affected();
/// # let _ = row_count;
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(limit: Duration, query: F) -> TimeoutResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let outcome = tokio::time::timeout(limit, query)
        .await
        .map_err(|_| TimeoutError::Elapsed(limit))?;
    Ok(outcome?)
}
