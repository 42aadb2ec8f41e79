use connectors::error::{HistoryError, KubeError, StoreError};
use thiserror::Error;

/// Top-level errors for the ingestion control loop.
///
/// Everything here is fatal to the in-flight cycle. Transient
/// conditions (empty listings, unready pods, malformed status output)
/// are absorbed by the polling states and never become an `IngestError`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Job creation came back non-zero; names the job that failed to
    /// start.
    #[error("Job {job} failed to start: {source}")]
    JobCreate {
        job: String,
        #[source]
        source: KubeError,
    },

    /// Orchestration call failed outside a poll-again state.
    #[error("Orchestration error: {0}")]
    Kube(#[from] KubeError),

    /// Storage delete failed during finalize.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The load record could not be persisted.
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// A cycle reached finalize without both loads recording an end.
    #[error("Cycle finalized before both loads completed")]
    IncompleteCycle,

    /// Shutdown was requested while a wait was in progress.
    #[error("Shutdown requested")]
    ShutdownRequested,
}
