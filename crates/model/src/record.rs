use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed cycle, persisted append-only to the load history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub ingest: String,
    pub ingest_type: String,
    /// Epoch milliseconds at finalize time.
    pub load_date: i64,
    pub readable_date: String,
    pub graph_job_duration: String,
    pub search_job_duration: String,
    pub total_job_duration: String,
}

/// Wall-clock duration the way operators read it in the load history:
/// `{hours}h:{minutes}mins`, minutes zero-padded, hours wrapping at 24.
pub fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let seconds = (end - start).num_seconds().max(0);
    let hours = (seconds / 3600) % 24;
    let minutes = (seconds / 60) % 60;
    format!("{hours}h:{minutes:02}mins")
}

/// Timestamp format shared by log lines and the record's readable field.
pub fn readable_date(at: DateTime<Utc>) -> String {
    at.format("%b %d %H:%M").to_string()
}
