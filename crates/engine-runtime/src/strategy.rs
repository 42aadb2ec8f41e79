use crate::{error::IngestError, lifecycle::JobRunner};
use futures::lock::Mutex;
use model::{batch::BatchKind, job::JobSpec, tracker::CycleTracker};
use std::sync::Arc;
use tracing::info;

/// Runs a cycle's two jobs with the execution shape the batch kind
/// requires.
///
/// Bulk loads are independent, so both lifecycles run concurrently and
/// the first failure wins (the sibling future is dropped, not awaited).
/// Delta loads are ordered: the search job is not created until the
/// graph job's rollout has verified, because the search mapping reads
/// what the graph load wrote.
pub async fn run_batch(
    runner: &JobRunner,
    kind: BatchKind,
    graph: &JobSpec,
    search: &JobSpec,
    tracker: &Arc<Mutex<CycleTracker>>,
) -> Result<(), IngestError> {
    match kind {
        BatchKind::Bulk => {
            info!(
                "Running {} and {} concurrently",
                graph.job_name, search.job_name
            );
            tokio::try_join!(runner.run(graph, tracker), runner.run(search, tracker))?;
            Ok(())
        }
        BatchKind::Incremental => {
            info!("Running {} then {}", graph.job_name, search.job_name);
            runner.run(graph, tracker).await?;
            runner.run(search, tracker).await
        }
    }
}
