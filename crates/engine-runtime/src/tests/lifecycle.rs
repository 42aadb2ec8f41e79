use crate::{error::IngestError, lifecycle::JobRunner, tests::support::ScriptedKube};
use futures::lock::Mutex;
use model::{batch::BatchKind, job::JobSpec, tracker::CycleTracker, workload::Workload};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

fn runner(kube: Arc<ScriptedKube>, cancel: CancellationToken) -> JobRunner {
    JobRunner::new(kube, Duration::from_millis(1), cancel)
}

fn tracker() -> Arc<Mutex<CycleTracker>> {
    Arc::new(Mutex::new(CycleTracker::new()))
}

// Scenario: healthy pods, job succeeds on the first poll, rollout
// comes up fresh.
// Expected: one create call, start and end recorded for the workload.
#[tokio::test]
async fn lifecycle_runs_to_done_and_records_times() {
    let kube = Arc::new(ScriptedKube::fresh());
    let runner = runner(kube.clone(), CancellationToken::new());
    let tracker = tracker();
    let spec = JobSpec::for_batch(Workload::Graph, BatchKind::Bulk, "1538055555");

    runner.run(&spec, &tracker).await.unwrap();

    assert_eq!(kube.created_names(), vec!["graph-bulk-1538055555"]);

    let tracker = tracker.lock().await;
    let start = tracker.start(Workload::Graph).unwrap();
    let end = tracker.end(Workload::Graph).unwrap();
    assert!(end >= start);
    assert!(tracker.start(Workload::Search).is_none());
}

// Scenario: job creation exits non-zero.
// Expected: the error names the job; no end timestamp is recorded.
#[tokio::test]
async fn failed_creation_names_the_job_and_stops() {
    let kube = Arc::new(ScriptedKube::failing_create("graph-delta"));
    let runner = runner(kube.clone(), CancellationToken::new());
    let tracker = tracker();
    let spec = JobSpec::for_batch(Workload::Graph, BatchKind::Incremental, "1111");

    let err = runner.run(&spec, &tracker).await.unwrap_err();

    match err {
        IngestError::JobCreate { job, .. } => assert_eq!(job, "graph-delta-1111"),
        other => panic!("expected JobCreate, got {other:?}"),
    }

    assert!(kube.created_names().is_empty());
    assert!(tracker.lock().await.end(Workload::Graph).is_none());
}

// Scenario: pods stay ready but report a start time from before the
// job began.
// Expected: rollout verification never passes; the lifecycle keeps
// polling and the end timestamp is never written.
#[tokio::test]
async fn rollout_verification_rejects_stale_pod_instances() {
    let kube = Arc::new(ScriptedKube::stale());
    let runner = runner(kube.clone(), CancellationToken::new());
    let tracker = tracker();
    let spec = JobSpec::for_batch(Workload::Search, BatchKind::Bulk, "1538055555");

    let result = timeout(Duration::from_millis(50), runner.run(&spec, &tracker)).await;

    assert!(result.is_err(), "lifecycle must not complete on stale pods");
    let tracker = tracker.lock().await;
    assert!(tracker.start(Workload::Search).is_some());
    assert!(tracker.end(Workload::Search).is_none());
}

// Scenario: shutdown requested mid-lifecycle.
// Expected: the first cancellable wait surfaces ShutdownRequested.
#[tokio::test]
async fn cancellation_unwinds_the_lifecycle() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let kube = Arc::new(ScriptedKube::stale());
    let runner = runner(kube, cancel);
    let tracker = tracker();
    let spec = JobSpec::for_batch(Workload::Graph, BatchKind::Bulk, "1538055555");

    let err = runner.run(&spec, &tracker).await.unwrap_err();
    assert!(matches!(err, IngestError::ShutdownRequested));
}
