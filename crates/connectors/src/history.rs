use crate::error::HistoryError;
use async_trait::async_trait;
use model::record::LoadRecord;
use tokio_postgres::{Client, Config, NoTls};
use tracing::error;

/// Append-only store of one document per completed cycle.
#[async_trait]
pub trait LoadHistory: Send + Sync {
    async fn insert(&self, record: &LoadRecord) -> Result<(), HistoryError>;
}

/// Postgres-backed history. Each record lands as a single JSONB row.
pub struct PgLoadHistory {
    client: Client,
}

impl PgLoadHistory {
    pub async fn connect(url: &str) -> Result<Self, HistoryError> {
        let config = url
            .parse::<Config>()
            .map_err(|e| HistoryError::InvalidUrl(e.to_string()))?;

        let (client, connection) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "Postgres connection error");
            }
        });

        client
            .execute(
                "CREATE TABLE IF NOT EXISTS load_history (
                    id BIGSERIAL PRIMARY KEY,
                    doc JSONB NOT NULL
                )",
                &[],
            )
            .await?;

        Ok(Self { client })
    }
}

#[async_trait]
impl LoadHistory for PgLoadHistory {
    async fn insert(&self, record: &LoadRecord) -> Result<(), HistoryError> {
        let doc = serde_json::to_value(record)?;
        self.client
            .execute("INSERT INTO load_history (doc) VALUES ($1)", &[&doc])
            .await?;
        Ok(())
    }
}
