//! Content store
//!
//! Commits new post documents for the external site build to pick up.
//! The committed document does not appear in the read snapshot until
//! that build republishes it.

use std::path::PathBuf;

use aws_sdk_s3::Client as S3Client;

use crate::config::{CloudflareConfig, ContentStoreConfig, StoreBackend};
use crate::error::AppError;
use crate::metrics::CONTENT_COMMITS_TOTAL;

enum Backend {
    File { root: PathBuf },
    R2 { client: S3Client, bucket: String },
}

/// Content store collaborator
pub struct ContentStore {
    backend: Backend,
    prefix: String,
}

impl ContentStore {
    /// Create the content store from configuration
    pub fn new(
        config: &ContentStoreConfig,
        cloudflare: Option<&CloudflareConfig>,
    ) -> Result<Self, AppError> {
        let backend = match config.backend {
            StoreBackend::File => {
                let root = config.path.clone().ok_or_else(|| {
                    AppError::Config("storage.content.path is required".to_string())
                })?;
                Backend::File { root }
            }
            StoreBackend::R2 => {
                let cloudflare = cloudflare.ok_or_else(|| {
                    AppError::Config("cloudflare credentials are required".to_string())
                })?;
                let bucket = config.bucket.clone().ok_or_else(|| {
                    AppError::Config("storage.content.bucket is required".to_string())
                })?;
                Backend::R2 {
                    client: super::build_r2_client(cloudflare),
                    bucket,
                }
            }
        };

        Ok(Self {
            backend,
            prefix: config.prefix.trim_matches('/').to_string(),
        })
    }

    /// Commit a post document under the configured prefix
    ///
    /// # Arguments
    /// * `name` - document file name, e.g. "1700000000000.md"
    /// * `content` - full document body
    ///
    /// # Errors
    /// `Storage` when the commit fails; the caller surfaces it as a
    /// terminal error for the request (no retry).
    pub async fn commit(&self, name: &str, content: &str) -> Result<(), AppError> {
        let result = self.commit_inner(name, content).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        CONTENT_COMMITS_TOTAL.with_label_values(&[status]).inc();
        result
    }

    async fn commit_inner(&self, name: &str, content: &str) -> Result<(), AppError> {
        let key = if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        };

        match &self.backend {
            Backend::File { root } => {
                let path = root.join(&key);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::Storage(format!("Content dir creation failed: {}", e))
                    })?;
                }
                tokio::fs::write(&path, content)
                    .await
                    .map_err(|e| AppError::Storage(format!("Content write failed: {}", e)))?;
            }
            Backend::R2 { client, bucket } => {
                use aws_sdk_s3::primitives::ByteStream;

                client
                    .put_object()
                    .bucket(bucket)
                    .key(&key)
                    .body(ByteStream::from(content.as_bytes().to_vec()))
                    .content_type("text/markdown; charset=utf-8")
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("R2 commit failed: {}", e)))?;
            }
        }

        tracing::info!(key = %key, "Post document committed");
        Ok(())
    }
}
