//! Cooperative cancellation checkpoints
//!
//! The runners never own or mutate the token; they only read its flag at the
//! checkpoints defined by the execution protocol. A process that has already
//! been spawned is not terminated here; cancellation suppresses the result.

use tokio_util::sync::CancellationToken;

use crate::error::ExecError;

/// Checkpoint guard: fail with [`ExecError::Cancelled`] once the token's
/// request flag is set.
///
/// Idempotent and side-effect free; with no token or an unset flag this is a
/// no-op.
pub fn check_cancelled(token: Option<&CancellationToken>) -> Result<(), ExecError> {
    match token {
        Some(token) if token.is_cancelled() => {
            tracing::debug!("cancellation observed at checkpoint");
            Err(ExecError::Cancelled {
                token: token.clone(),
            })
        }
        _ => Ok(()),
    }
}
