use crate::error::IngestError;
use connectors::kube::JobOrchestrator;
use model::{batch::BatchKind, workload::Workload};
use std::sync::Arc;
use tracing::{info, warn};

/// True for jobs owned by one of the loader workloads. Job names are
/// `-`-separated; membership means any token equals a workload id.
pub fn is_loader_job(name: &str) -> bool {
    name.split('-')
        .any(|token| Workload::ALL.iter().any(|workload| workload.id() == token))
}

/// Loader jobs carrying the given batch's job type, in listing order.
pub fn stale_jobs(names: &[String], kind: BatchKind) -> Vec<String> {
    let type_tag = format!("-{}-", kind.job_type());

    names
        .iter()
        .filter(|name| is_loader_job(name) && name.contains(&type_tag))
        .cloned()
        .collect()
}

/// Clears out jobs left over from previous cycles of the same ingest
/// type before new ones are created.
pub struct Reclaimer {
    orchestrator: Arc<dyn JobOrchestrator>,
}

impl Reclaimer {
    pub fn new(orchestrator: Arc<dyn JobOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// A listing failure aborts the cycle. One delete is issued per
    /// workload whether or not anything matched; a not-found delete is
    /// the common case and any delete failure is logged, not raised.
    pub async fn reclaim(&self, kind: BatchKind) -> Result<(), IngestError> {
        let names = self.orchestrator.list_jobs().await?;
        let stale = stale_jobs(&names, kind);

        if stale.is_empty() {
            info!("No stale jobs found");
        } else {
            info!(jobs = ?stale, "Deleting stale jobs");
        }

        for workload in Workload::ALL {
            let current = format!("{}-{}", workload.id(), kind.job_type());
            let target = stale
                .iter()
                .find(|name| name.starts_with(&current))
                .cloned()
                .unwrap_or(current);

            if let Err(error) = self.orchestrator.delete_job(&target).await {
                warn!(job = %target, %error, "Stale job delete failed");
            }
        }

        Ok(())
    }
}
