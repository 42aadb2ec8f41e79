use crate::workload::Workload;
use chrono::{DateTime, Utc};

/// Shared record of one cycle's progress: per-workload start/end
/// timestamps plus the batch's object keys.
///
/// Exactly one instance exists per process. Each workload's lifecycle
/// writes only its own timestamp pair, the finalizer reads everything
/// and resets it once the cycle's bookkeeping lands.
#[derive(Debug, Clone, Default)]
pub struct CycleTracker {
    graph_start: Option<DateTime<Utc>>,
    graph_end: Option<DateTime<Utc>>,
    search_start: Option<DateTime<Utc>>,
    search_end: Option<DateTime<Utc>>,
    files: Vec<String>,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_start(&mut self, workload: Workload, at: DateTime<Utc>) {
        match workload {
            Workload::Graph => self.graph_start = Some(at),
            Workload::Search => self.search_start = Some(at),
        }
    }

    pub fn mark_end(&mut self, workload: Workload, at: DateTime<Utc>) {
        match workload {
            Workload::Graph => self.graph_end = Some(at),
            Workload::Search => self.search_end = Some(at),
        }
    }

    pub fn start(&self, workload: Workload) -> Option<DateTime<Utc>> {
        match workload {
            Workload::Graph => self.graph_start,
            Workload::Search => self.search_start,
        }
    }

    pub fn end(&self, workload: Workload) -> Option<DateTime<Utc>> {
        match workload {
            Workload::Graph => self.graph_end,
            Workload::Search => self.search_end,
        }
    }

    pub fn set_files(&mut self, files: Vec<String>) {
        self.files = files;
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// A cycle is complete once both workloads have recorded an end.
    pub fn is_complete(&self) -> bool {
        self.graph_end.is_some() && self.search_end.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
