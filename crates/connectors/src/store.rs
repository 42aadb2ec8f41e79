use crate::error::StoreError;
use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    Client,
    types::{Delete, ObjectIdentifier},
};
use tracing::debug;

/// Narrow view of the object-storage collaborator: list keys under a
/// prefix, batch-delete keys. The orchestration logic never touches the
/// SDK directly.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Explicit endpoint (with forced path style) for S3-compatible
    /// stores outside AWS.
    pub endpoint: Option<String>,
}

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(config: S3Config) -> Self {
        let region = Region::new(config.region.clone());
        let base = aws_config::from_env().region(region.clone()).load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base).region(region);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(ref cont) = token {
                request = request.continuation_token(cont);
            }

            let resp = request.send().await.map_err(|e| StoreError::List {
                prefix: prefix.to_string(),
                message: e.to_string(),
            })?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            if resp.is_truncated().unwrap_or(false) {
                token = resp.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        debug!(prefix, count = keys.len(), "Listed objects");
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }

        // A single DeleteObjects call is capped at 1000 keys.
        for chunk in keys.chunks(1000) {
            let identifiers = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| StoreError::Delete(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let delete = Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
                .map_err(|e| StoreError::Delete(e.to_string()))?;

            self.client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| StoreError::Delete(e.to_string()))?;
        }

        debug!(count = keys.len(), "Deleted objects");
        Ok(())
    }
}
