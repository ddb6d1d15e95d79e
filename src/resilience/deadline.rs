use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::error;

/// Bound a whole operation by a caller-level deadline. `None` means unbounded.
pub async fn run_with_deadline<F, T>(deadline: Option<Duration>, operation: F) -> Result<T>
where
    F: Future<Output = T>,
{
    match deadline {
        None => Ok(operation.await),
        Some(limit) => tokio::time::timeout(limit, operation).await.map_err(|_| {
            error!("operation exceeded deadline of {:?}", limit);
            anyhow!("operation exceeded deadline of {:?}", limit)
        }),
    }
}
