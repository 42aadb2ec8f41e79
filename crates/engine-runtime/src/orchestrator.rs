use crate::{
    discovery::Locator, error::IngestError, finalize::Finalizer, lifecycle::JobRunner,
    reclaim::Reclaimer, strategy,
};
use connectors::{history::LoadHistory, kube::JobOrchestrator, store::ObjectStore};
use futures::lock::Mutex;
use model::{job::JobSpec, tracker::CycleTracker, workload::Workload};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::error;

pub struct OrchestratorParams {
    pub store: Arc<dyn ObjectStore>,
    pub orchestrator: Arc<dyn JobOrchestrator>,
    pub history: Arc<dyn LoadHistory>,
    pub pending_prefix: String,
    pub poll_interval: Duration,
    pub cancel: CancellationToken,
}

/// Wires the pipeline together and loops it: discovery, manifest gate,
/// stale-job reclamation, the two job lifecycles, finalization, repeat.
/// Any fatal error parks in the fail-stop sink.
pub struct Orchestrator {
    locator: Locator,
    reclaimer: Reclaimer,
    runner: JobRunner,
    finalizer: Finalizer,
    tracker: Arc<Mutex<CycleTracker>>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            locator: Locator::new(
                params.store.clone(),
                params.pending_prefix,
                params.poll_interval,
                params.cancel.clone(),
            ),
            reclaimer: Reclaimer::new(params.orchestrator.clone()),
            runner: JobRunner::new(
                params.orchestrator,
                params.poll_interval,
                params.cancel.clone(),
            ),
            finalizer: Finalizer::new(params.store, params.history),
            tracker: Arc::new(Mutex::new(CycleTracker::new())),
            interval: params.poll_interval,
            cancel: params.cancel,
        }
    }

    /// Runs cycles until shutdown. Only `ShutdownRequested` ever comes
    /// back; every other failure holds the process in the fail-stop
    /// sink until the supervisor restarts it.
    pub async fn run(&self) -> Result<(), IngestError> {
        loop {
            match self.run_cycle().await {
                Ok(()) => {}
                Err(IngestError::ShutdownRequested) => return Err(IngestError::ShutdownRequested),
                Err(err) => self.fail_stop(err).await?,
            }
        }
    }

    async fn run_cycle(&self) -> Result<(), IngestError> {
        let found = self.locator.locate().await?;
        self.locator.wait_for_manifest(&found.batch.name).await?;

        self.reclaimer.reclaim(found.batch.kind).await?;

        self.tracker.lock().await.set_files(found.files.clone());

        let graph = JobSpec::for_batch(Workload::Graph, found.batch.kind, &found.batch.name);
        let search = JobSpec::for_batch(Workload::Search, found.batch.kind, &found.batch.name);

        strategy::run_batch(&self.runner, found.batch.kind, &graph, &search, &self.tracker).await?;

        self.finalizer.finalize(&found.batch, &self.tracker).await?;
        Ok(())
    }

    /// Deliberate fail-stop: log and hold. A supervisor restart is the
    /// only way back to a clean discovery cycle.
    async fn fail_stop(&self, err: IngestError) -> Result<(), IngestError> {
        error!(error = %err, "Entering failed state, halting ingestion");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(IngestError::ShutdownRequested),
                _ = time::sleep(self.interval) => {}
            }
        }
    }
}
