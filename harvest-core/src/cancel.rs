use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};

/// Awaits an external call unless `cancel` fires first.
///
/// A cancelled call resolves to [`CoreError::Cancelled`] and its result, if
/// it ever arrives, is dropped unseen.
pub(crate) async fn guarded<T, E, F>(cancel: &CancellationToken, call: F) -> CoreResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<CoreError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Cancelled),
        result = call => result.map_err(Into::into),
    }
}
