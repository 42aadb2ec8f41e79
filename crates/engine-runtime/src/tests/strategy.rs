use crate::{error::IngestError, lifecycle::JobRunner, strategy::run_batch, tests::support::ScriptedKube};
use futures::lock::Mutex;
use model::{batch::BatchKind, job::JobSpec, tracker::CycleTracker, workload::Workload};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

fn specs(kind: BatchKind, name: &str) -> (JobSpec, JobSpec) {
    (
        JobSpec::for_batch(Workload::Graph, kind, name),
        JobSpec::for_batch(Workload::Search, kind, name),
    )
}

fn runner(kube: Arc<ScriptedKube>) -> JobRunner {
    JobRunner::new(kube, Duration::from_millis(1), CancellationToken::new())
}

// Scenario: bulk batch, both workloads healthy.
// Expected: both jobs are created and both workloads complete.
#[tokio::test]
async fn bulk_runs_both_workloads() {
    let kube = Arc::new(ScriptedKube::fresh());
    let runner = runner(kube.clone());
    let tracker = Arc::new(Mutex::new(CycleTracker::new()));
    let (graph, search) = specs(BatchKind::Bulk, "1538055555");

    run_batch(&runner, BatchKind::Bulk, &graph, &search, &tracker)
        .await
        .unwrap();

    let mut created = kube.created_names();
    created.sort();
    assert_eq!(created, vec!["graph-bulk-1538055555", "search-bulk-1538055555"]);
    assert!(tracker.lock().await.is_complete());
}

// Scenario: delta batch, both workloads healthy.
// Expected: the graph job's full lifecycle finishes before the search
// job is ever created.
#[tokio::test]
async fn delta_orders_graph_before_search() {
    let kube = Arc::new(ScriptedKube::fresh());
    let runner = runner(kube.clone());
    let tracker = Arc::new(Mutex::new(CycleTracker::new()));
    let (graph, search) = specs(BatchKind::Incremental, "1111");

    run_batch(&runner, BatchKind::Incremental, &graph, &search, &tracker)
        .await
        .unwrap();

    assert_eq!(
        kube.created_names(),
        vec!["graph-delta-1111", "search-delta-1111"]
    );

    let tracker = tracker.lock().await;
    let graph_end = tracker.end(Workload::Graph).unwrap();
    let search_start = tracker.start(Workload::Search).unwrap();
    assert!(search_start >= graph_end);
}

// Scenario: delta batch where graph job creation fails.
// Expected: the error names the graph job and the search job is never
// created.
#[tokio::test]
async fn delta_stops_before_search_when_graph_creation_fails() {
    let kube = Arc::new(ScriptedKube::failing_create("graph-delta"));
    let runner = runner(kube.clone());
    let tracker = Arc::new(Mutex::new(CycleTracker::new()));
    let (graph, search) = specs(BatchKind::Incremental, "2222");

    let err = run_batch(&runner, BatchKind::Incremental, &graph, &search, &tracker)
        .await
        .unwrap_err();

    match err {
        IngestError::JobCreate { job, .. } => assert_eq!(job, "graph-delta-2222"),
        other => panic!("expected JobCreate, got {other:?}"),
    }

    assert!(kube.created_names().is_empty());
    assert!(!tracker.lock().await.is_complete());
}
