//! Snapshot store
//!
//! Retrieves the published snapshot document. Loaded fresh on every
//! read request: the snapshot is the unit of consistency, and a single
//! request must never observe two different loads.

use std::path::PathBuf;

use aws_sdk_s3::Client as S3Client;

use crate::config::{CloudflareConfig, SnapshotStoreConfig, StoreBackend};
use crate::data::Snapshot;
use crate::error::AppError;
use crate::metrics::SNAPSHOT_LOADS_TOTAL;

enum Backend {
    File { path: PathBuf },
    R2 { client: S3Client, bucket: String, key: String },
}

/// Snapshot store collaborator
pub struct SnapshotStore {
    backend: Backend,
}

impl SnapshotStore {
    /// Create the snapshot store from configuration
    ///
    /// # Errors
    /// Returns a configuration error when the selected backend is
    /// missing its settings (also caught earlier by config validation).
    pub fn new(
        config: &SnapshotStoreConfig,
        cloudflare: Option<&CloudflareConfig>,
    ) -> Result<Self, AppError> {
        let backend = match config.backend {
            StoreBackend::File => {
                let path = config.path.clone().ok_or_else(|| {
                    AppError::Config("storage.snapshot.path is required".to_string())
                })?;
                Backend::File { path }
            }
            StoreBackend::R2 => {
                let cloudflare = cloudflare.ok_or_else(|| {
                    AppError::Config("cloudflare credentials are required".to_string())
                })?;
                let bucket = config.bucket.clone().ok_or_else(|| {
                    AppError::Config("storage.snapshot.bucket is required".to_string())
                })?;
                Backend::R2 {
                    client: super::build_r2_client(cloudflare),
                    bucket,
                    key: config.key.clone(),
                }
            }
        };

        Ok(Self { backend })
    }

    /// Load and normalize the published snapshot
    ///
    /// # Errors
    /// `Storage` when the document cannot be retrieved or parsed.
    pub async fn load(&self) -> Result<Snapshot, AppError> {
        let result = self.load_inner().await;
        let status = if result.is_ok() { "ok" } else { "error" };
        SNAPSHOT_LOADS_TOTAL.with_label_values(&[status]).inc();
        result
    }

    async fn load_inner(&self) -> Result<Snapshot, AppError> {
        let bytes = match &self.backend {
            Backend::File { path } => tokio::fs::read(path).await.map_err(|e| {
                AppError::Storage(format!("Snapshot read failed: {}", e))
            })?,
            Backend::R2 {
                client,
                bucket,
                key,
            } => {
                let object = client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("R2 snapshot fetch failed: {}", e)))?;
                object
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::Storage(format!("R2 snapshot read failed: {}", e)))?
                    .into_bytes()
                    .to_vec()
            }
        };

        let mut snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Storage(format!("Snapshot parse failed: {}", e)))?;
        snapshot.normalize();
        Ok(snapshot)
    }
}
