/// The two downstream systems every batch is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workload {
    /// Graph store. Loaded first for delta ingests.
    Graph,
    /// Search index. Its delta mapping reads what the graph load wrote,
    /// so for delta ingests it must never start before Graph finishes.
    Search,
}

impl Workload {
    pub const ALL: [Workload; 2] = [Workload::Graph, Workload::Search];

    /// Identifier used as the leading token of job and template names.
    pub fn id(&self) -> &'static str {
        match self {
            Workload::Graph => "graph",
            Workload::Search => "search",
        }
    }

    /// Fixed pod names whose `build` container gates this workload's
    /// lifecycle.
    pub fn health_check_targets(&self) -> [&'static str; 2] {
        match self {
            Workload::Graph => ["graph-0", "graph-1"],
            Workload::Search => ["search-0", "search-1"],
        }
    }
}
