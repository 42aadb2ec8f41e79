use connectors::error::HistoryError;
use engine_config::error::SettingsError;
use engine_runtime::error::IngestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to connect the load history store: {0}")]
    History(#[from] HistoryError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),
}
