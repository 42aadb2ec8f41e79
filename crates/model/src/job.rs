use crate::{batch::BatchKind, workload::Workload};

/// Everything needed to drive one workload's job through a cycle.
/// One pair is constructed per discovered batch and discarded after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub workload: Workload,
    pub job_name: String,
    pub template_name: String,
    pub health_check_targets: Vec<String>,
}

impl JobSpec {
    /// Jobs are named `{workload}-{job_type}-{batch}` and created from
    /// the `{workload}-{job_type}` template.
    pub fn for_batch(workload: Workload, kind: BatchKind, batch_name: &str) -> Self {
        let template_name = format!("{}-{}", workload.id(), kind.job_type());
        let job_name = format!("{template_name}-{batch_name}");

        Self {
            workload,
            job_name,
            template_name,
            health_check_targets: workload
                .health_check_targets()
                .iter()
                .map(|pod| pod.to_string())
                .collect(),
        }
    }
}
