/// The two kinds of ingest batch, signalled by the marker file the
/// producer uploads alongside the batch's data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Bulk,
    Incremental,
}

impl BatchKind {
    /// Recognize a marker file name. Anything other than the two known
    /// markers contributes no batch.
    pub fn from_marker(file: &str) -> Option<Self> {
        match file {
            "bulk.txt" => Some(BatchKind::Bulk),
            "incremental.txt" => Some(BatchKind::Incremental),
            _ => None,
        }
    }

    /// Job-type alias used in job and template names. Incremental
    /// batches run `delta` jobs.
    pub fn job_type(&self) -> &'static str {
        match self {
            BatchKind::Bulk => "bulk",
            BatchKind::Incremental => "delta",
        }
    }

    /// Ingest-type label persisted in the load record.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Bulk => "bulk",
            BatchKind::Incremental => "incremental",
        }
    }
}

/// One unit of ingest work: a timestamp-named folder under the pending
/// prefix plus the kind its marker file declared. Immutable for the
/// lifetime of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDescriptor {
    pub name: String,
    pub kind: BatchKind,
}

impl BatchDescriptor {
    pub fn new(name: impl Into<String>, kind: BatchKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
