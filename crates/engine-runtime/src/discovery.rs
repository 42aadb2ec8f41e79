use crate::error::IngestError;
use connectors::store::ObjectStore;
use model::batch::{BatchDescriptor, BatchKind};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A discovered batch: the descriptor plus every object key that will
/// be deleted once both loads verify complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub batch: BatchDescriptor,
    pub files: Vec<String>,
}

/// Watches the pending prefix for the oldest eligible batch and gates
/// on its manifest. Read-only against storage; every failure here is a
/// poll-again, never a fatal.
pub struct Locator {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    interval: Duration,
    cancel: CancellationToken,
}

impl Locator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            interval,
            cancel,
        }
    }

    /// One listing pass; `None` means "nothing eligible yet, ask again".
    pub async fn find_batch(&self) -> Option<Discovery> {
        let keys = match self.store.list(&self.prefix).await {
            Ok(keys) => keys,
            Err(error) => {
                warn!(%error, "Pending listing failed");
                return None;
            }
        };

        if keys.is_empty() || !has_timestamp_folders(&keys) {
            return None;
        }

        let (name, marker) = select_oldest(&keys)?;
        let kind = BatchKind::from_marker(&marker)?;
        let files = batch_files(&self.prefix, &name, &keys);

        Some(Discovery {
            batch: BatchDescriptor::new(name, kind),
            files,
        })
    }

    /// Poll until a batch shows up.
    pub async fn locate(&self) -> Result<Discovery, IngestError> {
        loop {
            if let Some(found) = self.find_batch().await {
                info!(
                    batch = %found.batch.name,
                    kind = found.batch.kind.as_str(),
                    "New ingest detected, waiting for manifest file"
                );
                return Ok(found);
            }
            self.sleep().await?;
        }
    }

    /// Block until the batch's manifest exists. The producer is trusted
    /// to finish uploading eventually; there is no retry bound.
    pub async fn wait_for_manifest(&self, batch_name: &str) -> Result<(), IngestError> {
        let manifest_prefix = format!("{}{}/manifest.json", self.prefix, batch_name);

        loop {
            match self.store.list(&manifest_prefix).await {
                Ok(keys) if !keys.is_empty() => {
                    debug!(batch = batch_name, "Manifest present");
                    return Ok(());
                }
                Ok(_) => {}
                Err(error) => warn!(%error, "Manifest listing failed"),
            }
            self.sleep().await?;
        }
    }

    async fn sleep(&self) -> Result<(), IngestError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(IngestError::ShutdownRequested),
            _ = time::sleep(self.interval) => Ok(()),
        }
    }
}

/// True when a folder label starts with a positive integer (a Unix
/// timestamp, possibly suffixed).
pub fn has_timestamp_prefix(label: &str) -> bool {
    let digits = label
        .as_bytes()
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();

    digits > 0
        && label[..digits]
            .parse::<i64>()
            .map(|value| value > 0)
            .unwrap_or(false)
}

/// True when any key's second path segment is timestamp-named.
pub fn has_timestamp_folders(keys: &[String]) -> bool {
    keys.iter().any(|key| {
        key.split('/')
            .nth(1)
            .map(has_timestamp_prefix)
            .unwrap_or(false)
    })
}

/// The oldest `(folder, marker)` pair among recognized marker files.
///
/// Ordering is string comparison over the raw tuple, not numeric:
/// equal-length timestamps sort correctly, unequal-length names do not.
/// Known quirk, pinned by a test below.
pub fn select_oldest(keys: &[String]) -> Option<(String, String)> {
    let mut candidates: Vec<(String, String)> = keys
        .iter()
        .filter_map(|key| {
            let mut segments = key.split('/');
            let _root = segments.next()?;
            let name = segments.next()?;
            let marker = segments.next()?;

            BatchKind::from_marker(marker).map(|_| (name.to_string(), marker.to_string()))
        })
        .collect();

    candidates.sort();
    candidates.into_iter().next()
}

/// Every key belonging to the batch (any key with `name` as a path
/// segment), preceded by the two synthetic entries for the manifest and
/// the folder itself.
pub fn batch_files(prefix: &str, name: &str, keys: &[String]) -> Vec<String> {
    let mut files = vec![format!("{prefix}{name}/manifest.json"), format!("{prefix}{name}")];

    files.extend(
        keys.iter()
            .filter(|key| key.split('/').any(|segment| segment == name))
            .cloned(),
    );

    files
}
