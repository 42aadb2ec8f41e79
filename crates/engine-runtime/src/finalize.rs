use crate::error::IngestError;
use chrono::{DateTime, Utc};
use connectors::{history::LoadHistory, store::ObjectStore};
use futures::lock::Mutex;
use model::{
    batch::BatchDescriptor,
    record::{LoadRecord, format_duration, readable_date},
    tracker::CycleTracker,
    workload::Workload,
};
use std::sync::Arc;
use tracing::info;

/// Post-completion bookkeeping: delete the batch's source files,
/// persist the load record, hand the tracker back empty for the next
/// cycle.
pub struct Finalizer {
    store: Arc<dyn ObjectStore>,
    history: Arc<dyn LoadHistory>,
}

impl Finalizer {
    pub fn new(store: Arc<dyn ObjectStore>, history: Arc<dyn LoadHistory>) -> Self {
        Self { store, history }
    }

    /// A storage delete failure is fatal: the record must not claim a
    /// cycle whose files are still in the bucket.
    pub async fn finalize(
        &self,
        batch: &BatchDescriptor,
        tracker: &Arc<Mutex<CycleTracker>>,
    ) -> Result<LoadRecord, IngestError> {
        let snapshot = tracker.lock().await.clone();

        self.store.delete(snapshot.files()).await?;

        let now = Utc::now();
        let record = build_record(batch, &snapshot, now)?;
        self.history.insert(&record).await?;
        info!("{}: {:?}", readable_date(now), record);

        tracker.lock().await.reset();
        Ok(record)
    }
}

fn build_record(
    batch: &BatchDescriptor,
    tracker: &CycleTracker,
    now: DateTime<Utc>,
) -> Result<LoadRecord, IngestError> {
    let (graph_start, graph_end) = span(tracker, Workload::Graph)?;
    let (search_start, search_end) = span(tracker, Workload::Search)?;

    Ok(LoadRecord {
        ingest: batch.name.clone(),
        ingest_type: batch.kind.as_str().to_string(),
        load_date: now.timestamp_millis(),
        readable_date: readable_date(now),
        graph_job_duration: format_duration(graph_start, graph_end),
        search_job_duration: format_duration(search_start, search_end),
        total_job_duration: format_duration(graph_start, now),
    })
}

fn span(
    tracker: &CycleTracker,
    workload: Workload,
) -> Result<(DateTime<Utc>, DateTime<Utc>), IngestError> {
    match (tracker.start(workload), tracker.end(workload)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(IngestError::IncompleteCycle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::batch::BatchKind;

    #[test]
    fn record_durations_come_from_the_tracker() {
        let mut tracker = CycleTracker::new();
        let base = Utc.with_ymd_and_hms(2018, 9, 27, 13, 0, 0).unwrap();

        tracker.mark_start(Workload::Graph, base);
        tracker.mark_end(Workload::Graph, base + chrono::Duration::minutes(90));
        tracker.mark_start(Workload::Search, base + chrono::Duration::minutes(90));
        tracker.mark_end(Workload::Search, base + chrono::Duration::minutes(99));

        let batch = BatchDescriptor::new("1538055555", BatchKind::Bulk);
        let now = base + chrono::Duration::minutes(105);
        let record = build_record(&batch, &tracker, now).unwrap();

        assert_eq!(record.ingest, "1538055555");
        assert_eq!(record.ingest_type, "bulk");
        assert_eq!(record.graph_job_duration, "1h:30mins");
        assert_eq!(record.search_job_duration, "0h:09mins");
        assert_eq!(record.total_job_duration, "1h:45mins");
        assert_eq!(record.load_date, now.timestamp_millis());
    }

    #[test]
    fn incomplete_tracker_cannot_build_a_record() {
        let mut tracker = CycleTracker::new();
        tracker.mark_start(Workload::Graph, Utc::now());

        let batch = BatchDescriptor::new("1111", BatchKind::Incremental);
        let result = build_record(&batch, &tracker, Utc::now());

        assert!(matches!(result, Err(IngestError::IncompleteCycle)));
    }
}
