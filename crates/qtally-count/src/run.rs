//! Circuit execution with a deadline.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use qtally_hal::{Backend, Counts};
use qtally_ir::Circuit;

use crate::error::{CountError, CountResult};

/// Submit `circuit` and wait for its histogram.
///
/// Backend errors are returned unchanged inside [`CountError::Execution`].
/// When `timeout` elapses first the job is cancelled and
/// [`CountError::Timeout`] is returned.
#[instrument(skip(backend, circuit), fields(backend = backend.name(), qubits = circuit.num_qubits()))]
pub async fn run<B>(
    backend: &B,
    circuit: &Circuit,
    shots: u32,
    timeout: Duration,
) -> CountResult<Counts>
where
    B: Backend + ?Sized,
{
    let job_id = backend.submit(circuit, shots).await?;
    debug!(%job_id, "submitted counting circuit");

    match tokio::time::timeout(timeout, backend.wait(&job_id)).await {
        Ok(result) => {
            let result = result?;
            debug!(
                %job_id,
                outcomes = result.counts.len(),
                execution_time_ms = ?result.execution_time_ms,
                "job completed"
            );
            Ok(result.counts)
        }
        Err(_) => {
            warn!(%job_id, ?timeout, "job timed out, cancelling");
            if let Err(e) = backend.cancel(&job_id).await {
                warn!(%job_id, error = %e, "failed to cancel timed-out job");
            }
            Err(CountError::Timeout {
                job_id: job_id.0,
                timeout,
            })
        }
    }
}
