use crate::error::KubeError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::debug;

/// The container whose readiness gates a workload's pods.
const HEALTH_CONTAINER: &str = "build";

/// Health snapshot of one pod's build container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodHealth {
    pub ready: bool,
    /// When the container's current instance started, if it is running.
    pub started_at: Option<DateTime<Utc>>,
}

/// Narrow view of the workload-orchestration collaborator. Implemented
/// by shelling out to kubectl in production and by scripted fakes in
/// tests; the control loop only ever sees this trait.
#[async_trait]
pub trait JobOrchestrator: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<String>, KubeError>;

    async fn create_job(&self, name: &str, template: &str) -> Result<(), KubeError>;

    async fn delete_job(&self, name: &str) -> Result<(), KubeError>;

    async fn job_succeeded(&self, name: &str) -> Result<bool, KubeError>;

    async fn pod_health(&self, pod: &str) -> Result<PodHealth, KubeError>;
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    items: Vec<JobItem>,
}

#[derive(Debug, Deserialize)]
struct JobItem {
    #[serde(default)]
    metadata: JobMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct JobMetadata {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct JobObject {
    #[serde(default)]
    status: JobStatus,
}

#[derive(Debug, Default, Deserialize)]
struct JobStatus {
    #[serde(default)]
    succeeded: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PodObject {
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Default, Deserialize)]
struct PodStatus {
    #[serde(default, rename = "containerStatuses")]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Deserialize)]
struct ContainerStatus {
    #[serde(default)]
    name: String,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: ContainerState,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerState {
    running: Option<RunningState>,
}

#[derive(Debug, Deserialize)]
struct RunningState {
    #[serde(rename = "startedAt")]
    started_at: Option<DateTime<Utc>>,
}

impl PodHealth {
    fn from_pod(pod: &PodObject) -> Self {
        match pod
            .status
            .container_statuses
            .iter()
            .find(|container| container.name == HEALTH_CONTAINER)
        {
            Some(container) => PodHealth {
                ready: container.ready,
                started_at: container
                    .state
                    .running
                    .as_ref()
                    .and_then(|running| running.started_at),
            },
            None => PodHealth {
                ready: false,
                started_at: None,
            },
        }
    }
}

/// kubectl-shelled implementation. Every call builds one command, runs
/// it to completion and parses stdout; exit status, stderr and parse
/// failures surface as distinct `KubeError` variants so callers can
/// tell "ask again" from "broken".
pub struct Kubectl {
    program: String,
    token: String,
    context: Option<String>,
    namespace: Option<String>,
}

impl Kubectl {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            program: "kubectl".to_string(),
            token: token.into(),
            context: None,
            namespace: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Point at a different executable (a stub in tests, a bundled
    /// binary in containers).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        if let Some(namespace) = &self.namespace {
            args.push("-n".to_string());
            args.push(namespace.clone());
        }
        args.push("--token".to_string());
        args.push(self.token.clone());
        args
    }

    /// Run one kubectl invocation. The error label carries only the
    /// operation args, never the token.
    async fn run(&self, op_args: &[&str]) -> Result<String, KubeError> {
        let command = format!("{} {}", self.program, op_args.join(" "));
        debug!(%command, "Running orchestration command");

        let mut args = self.base_args();
        args.extend(op_args.iter().map(|arg| arg.to_string()));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| KubeError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(KubeError::NonZeroExit {
                command,
                status: output.status.code().unwrap_or(-1),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(KubeError::Stderr {
                command,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse<T: DeserializeOwned>(command: &str, stdout: &str) -> Result<T, KubeError> {
    serde_json::from_str(stdout).map_err(|source| KubeError::MalformedOutput {
        command: command.to_string(),
        source,
    })
}

#[async_trait]
impl JobOrchestrator for Kubectl {
    async fn list_jobs(&self) -> Result<Vec<String>, KubeError> {
        let stdout = self.run(&["get", "jobs", "-o", "json"]).await?;
        let jobs: JobList = parse("kubectl get jobs", &stdout)?;
        Ok(jobs.items.into_iter().map(|item| item.metadata.name).collect())
    }

    async fn create_job(&self, name: &str, template: &str) -> Result<(), KubeError> {
        let from = format!("--from=cronjob/{template}");
        self.run(&["create", "job", name, &from]).await.map(|_| ())
    }

    async fn delete_job(&self, name: &str) -> Result<(), KubeError> {
        self.run(&["delete", "job", name]).await.map(|_| ())
    }

    async fn job_succeeded(&self, name: &str) -> Result<bool, KubeError> {
        let stdout = self.run(&["get", "job", name, "-o", "json"]).await?;
        let job: JobObject = parse("kubectl get job", &stdout)?;
        Ok(job.status.succeeded.unwrap_or(0) > 0)
    }

    async fn pod_health(&self, pod: &str) -> Result<PodHealth, KubeError> {
        let stdout = self.run(&["get", "pods", pod, "-o", "json"]).await?;
        let pod: PodObject = parse("kubectl get pods", &stdout)?;
        Ok(PodHealth::from_pod(&pod))
    }
}
