//! Snapshot and content store collaborators
//!
//! Handles:
//! - Loading the published post snapshot (read path)
//! - Committing new post documents (write path)
//!
//! Both stores speak either Cloudflare R2 or the local filesystem,
//! selected by configuration. The R2 path is the production one; the
//! file path serves development and tests.

mod content;
mod snapshot;

pub use content::ContentStore;
pub use snapshot::SnapshotStore;

use crate::config::CloudflareConfig;

pub(crate) fn build_r2_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_only()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}

/// Build an S3-compatible client for Cloudflare R2
pub(crate) fn build_r2_client(cloudflare: &CloudflareConfig) -> aws_sdk_s3::Client {
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    // R2 endpoint: https://{account_id}.r2.cloudflarestorage.com
    let endpoint = format!("https://{}.r2.cloudflarestorage.com", cloudflare.account_id);

    let credentials = Credentials::new(
        &cloudflare.r2_access_key_id,
        &cloudflare.r2_secret_access_key,
        None,
        None,
        "amberfeed-r2",
    );

    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("auto"))
        .endpoint_url(&endpoint)
        .credentials_provider(credentials)
        .http_client(build_r2_http_client())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
