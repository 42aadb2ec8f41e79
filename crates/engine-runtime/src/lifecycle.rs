use crate::error::IngestError;
use chrono::{DateTime, Utc};
use connectors::kube::{JobOrchestrator, PodHealth};
use futures::lock::Mutex;
use model::{job::JobSpec, record::readable_date, tracker::CycleTracker};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Phases of one workload's job, in order. Every poll-shaped phase
/// treats orchestrator errors and malformed responses as "not yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// All health-check pods report a ready build container.
    WaitingForHealthyPods,
    /// Job created from its template; start timestamp recorded first.
    Creating,
    /// Job status polled until the orchestrator reports success.
    Running,
    /// One interval's grace for the deployment to begin rolling pods.
    WaitingForRollingUpdate,
    /// Pods ready again AND started after the job did; end recorded.
    VerifyingRollout,
    Done,
}

/// Drives a single job through its phases against the orchestrator.
pub struct JobRunner {
    orchestrator: Arc<dyn JobOrchestrator>,
    interval: Duration,
    cancel: CancellationToken,
}

impl JobRunner {
    pub fn new(
        orchestrator: Arc<dyn JobOrchestrator>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            interval,
            cancel,
        }
    }

    /// Runs `spec`'s job to completion, recording start and end times
    /// in the shared tracker. Returns on the first fatal transition
    /// with no further tracker mutation.
    pub async fn run(
        &self,
        spec: &JobSpec,
        tracker: &Arc<Mutex<CycleTracker>>,
    ) -> Result<(), IngestError> {
        let mut phase = JobPhase::WaitingForHealthyPods;

        loop {
            match phase {
                JobPhase::WaitingForHealthyPods => {
                    if self.pods_ready(spec, None).await {
                        phase = JobPhase::Creating;
                    } else {
                        self.sleep().await?;
                    }
                }
                JobPhase::Creating => {
                    let started = Utc::now();
                    tracker.lock().await.mark_start(spec.workload, started);
                    info!("{}: starting {}", readable_date(started), spec.job_name);

                    self.orchestrator
                        .create_job(&spec.job_name, &spec.template_name)
                        .await
                        .map_err(|source| IngestError::JobCreate {
                            job: spec.job_name.clone(),
                            source,
                        })?;

                    phase = JobPhase::Running;
                }
                JobPhase::Running => match self.orchestrator.job_succeeded(&spec.job_name).await {
                    Ok(true) => phase = JobPhase::WaitingForRollingUpdate,
                    Ok(false) => self.sleep().await?,
                    Err(error) => {
                        debug!(job = %spec.job_name, %error, "Job status check failed");
                        self.sleep().await?;
                    }
                },
                JobPhase::WaitingForRollingUpdate => {
                    self.sleep().await?;
                    phase = JobPhase::VerifyingRollout;
                }
                JobPhase::VerifyingRollout => {
                    let started = tracker.lock().await.start(spec.workload);
                    if self.pods_ready(spec, started).await {
                        let finished = Utc::now();
                        tracker.lock().await.mark_end(spec.workload, finished);
                        info!("{}: {} complete", readable_date(finished), spec.job_name);
                        phase = JobPhase::Done;
                    } else {
                        self.sleep().await?;
                    }
                }
                JobPhase::Done => return Ok(()),
            }
        }
    }

    /// All of the job's health-check pods healthy. With `after` set, a
    /// pod only counts if its build container started after that
    /// instant; a pod still ready from before the job ran must not pass.
    async fn pods_ready(&self, spec: &JobSpec, after: Option<DateTime<Utc>>) -> bool {
        for pod in &spec.health_check_targets {
            let health = match self.orchestrator.pod_health(pod).await {
                Ok(health) => health,
                Err(error) => {
                    debug!(pod = %pod, %error, "Pod health check failed");
                    return false;
                }
            };

            if !is_fresh(health, after) {
                return false;
            }
        }

        true
    }

    async fn sleep(&self) -> Result<(), IngestError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(IngestError::ShutdownRequested),
            _ = time::sleep(self.interval) => Ok(()),
        }
    }
}

/// Readiness predicate shared by the initial wait (`after == None`) and
/// rollout verification.
pub fn is_fresh(health: PodHealth, after: Option<DateTime<Utc>>) -> bool {
    if !health.ready {
        return false;
    }

    match after {
        None => true,
        Some(threshold) => health
            .started_at
            .map(|at| at > threshold)
            .unwrap_or(false),
    }
}
