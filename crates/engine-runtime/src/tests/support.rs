use async_trait::async_trait;
use chrono::{Duration as TimeDelta, Utc};
use connectors::{
    error::KubeError,
    kube::{JobOrchestrator, PodHealth},
};
use std::sync::Mutex;

/// Scripted orchestrator for state-machine tests: pods are always
/// ready with a configurable start-time offset, jobs succeed on the
/// first status poll, and every mutating call is recorded in order.
pub struct ScriptedKube {
    pub created: Mutex<Vec<String>>,
    fail_create_prefix: Option<String>,
    pod_started_offset: TimeDelta,
}

impl ScriptedKube {
    /// Pods report a start time in the future, so rollout verification
    /// always sees a fresh instance.
    pub fn fresh() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            fail_create_prefix: None,
            pod_started_offset: TimeDelta::hours(1),
        }
    }

    /// Pods report a start time from before any job began; rollout
    /// verification must never accept them.
    pub fn stale() -> Self {
        Self {
            pod_started_offset: TimeDelta::hours(-1),
            ..Self::fresh()
        }
    }

    /// Job creation fails for names starting with `prefix`.
    pub fn failing_create(prefix: &str) -> Self {
        Self {
            fail_create_prefix: Some(prefix.to_string()),
            ..Self::fresh()
        }
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobOrchestrator for ScriptedKube {
    async fn list_jobs(&self) -> Result<Vec<String>, KubeError> {
        Ok(Vec::new())
    }

    async fn create_job(&self, name: &str, _template: &str) -> Result<(), KubeError> {
        if let Some(prefix) = &self.fail_create_prefix {
            if name.starts_with(prefix.as_str()) {
                return Err(KubeError::NonZeroExit {
                    command: format!("kubectl create job {name}"),
                    status: 1,
                });
            }
        }

        self.created.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn delete_job(&self, _name: &str) -> Result<(), KubeError> {
        Ok(())
    }

    async fn job_succeeded(&self, _name: &str) -> Result<bool, KubeError> {
        Ok(true)
    }

    async fn pod_health(&self, _pod: &str) -> Result<PodHealth, KubeError> {
        Ok(PodHealth {
            ready: true,
            started_at: Some(Utc::now() + self.pod_started_offset),
        })
    }
}
