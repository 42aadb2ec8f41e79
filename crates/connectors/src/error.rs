use thiserror::Error;

/// Errors from the object-storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Listing a prefix failed.
    #[error("Object listing failed for {prefix}: {message}")]
    List { prefix: String, message: String },

    /// Deleting a key batch failed.
    #[error("Object delete failed: {0}")]
    Delete(String),
}

/// Errors from the workload-orchestration command interface.
///
/// Callers treat all of these as poll-again in the polling lifecycle
/// states, and as fatal during job creation and job listing.
#[derive(Debug, Error)]
pub enum KubeError {
    /// The command could not be executed at all.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited non-zero.
    #[error("{command} exited with status {status}")]
    NonZeroExit { command: String, status: i32 },

    /// The command wrote to its error stream.
    #[error("{command} reported: {stderr}")]
    Stderr { command: String, stderr: String },

    /// The command's output was not the JSON we expected.
    #[error("Malformed output from {command}: {source}")]
    MalformedOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the load-history document store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid history connection string: {0}")]
    InvalidUrl(String),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Failed to serialize load record: {0}")]
    Serialize(#[from] serde_json::Error),
}
