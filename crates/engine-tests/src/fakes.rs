use async_trait::async_trait;
use chrono::{Duration as TimeDelta, Utc};
use connectors::{
    error::{HistoryError, KubeError, StoreError},
    history::LoadHistory,
    kube::{JobOrchestrator, PodHealth},
    store::ObjectStore,
};
use model::record::LoadRecord;
use std::sync::Mutex;

/// In-memory object store with S3 listing semantics (prefix match over
/// full keys). Every delete call is recorded for assertions.
pub struct InMemoryStore {
    objects: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<Vec<String>>>,
    fail_delete: bool,
}

impl InMemoryStore {
    pub fn new(initial: &[&str]) -> Self {
        Self {
            objects: Mutex::new(initial.iter().map(|key| key.to_string()).collect()),
            deletes: Mutex::new(Vec::new()),
            fail_delete: false,
        }
    }

    pub fn failing_delete(initial: &[&str]) -> Self {
        Self {
            fail_delete: true,
            ..Self::new(initial)
        }
    }

    pub fn add(&self, key: &str) {
        self.objects.lock().unwrap().push(key.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        self.deletes.lock().unwrap().push(keys.to_vec());

        if self.fail_delete {
            return Err(StoreError::Delete("injected delete failure".to_string()));
        }

        self.objects
            .lock()
            .unwrap()
            .retain(|key| !keys.contains(key));
        Ok(())
    }
}

/// Scripted workload orchestrator: jobs succeed on the first status
/// poll and pods always report ready with a configurable start-time
/// offset. Create attempts and deletes are recorded in call order.
pub struct FakeKube {
    jobs: Mutex<Vec<String>>,
    /// Every create call, including failed ones.
    pub attempted: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    fail_create_prefix: Option<String>,
    pod_started_offset: TimeDelta,
}

impl FakeKube {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            attempted: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_create_prefix: None,
            pod_started_offset: TimeDelta::hours(1),
        }
    }

    /// Pre-existing jobs returned by `list_jobs`.
    pub fn with_jobs(jobs: &[&str]) -> Self {
        Self {
            jobs: Mutex::new(jobs.iter().map(|name| name.to_string()).collect()),
            ..Self::new()
        }
    }

    pub fn failing_create(prefix: &str) -> Self {
        Self {
            fail_create_prefix: Some(prefix.to_string()),
            ..Self::new()
        }
    }

    pub fn attempted_names(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for FakeKube {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobOrchestrator for FakeKube {
    async fn list_jobs(&self) -> Result<Vec<String>, KubeError> {
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn create_job(&self, name: &str, _template: &str) -> Result<(), KubeError> {
        self.attempted.lock().unwrap().push(name.to_string());

        if let Some(prefix) = &self.fail_create_prefix {
            if name.starts_with(prefix.as_str()) {
                return Err(KubeError::NonZeroExit {
                    command: format!("kubectl create job {name}"),
                    status: 1,
                });
            }
        }

        self.jobs.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn delete_job(&self, name: &str) -> Result<(), KubeError> {
        self.deleted.lock().unwrap().push(name.to_string());
        self.jobs.lock().unwrap().retain(|job| job != name);
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

/// Records every inserted load record.
#[derive(Default)]
pub struct RecordingHistory {
    pub records: Mutex<Vec<LoadRecord>>,
}

impl RecordingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<LoadRecord> {
        self.records.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LoadHistory for RecordingHistory {
    async fn insert(&self, record: &LoadRecord) -> Result<(), HistoryError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
