// src/storage/s3.rs

//! AWS S3 blob store.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};

use super::{BackendKind, BlobStore, WriteReceipt};

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Writes batches to an S3 bucket. One put per batch, no retries.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store with an existing client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Create a store from ambient AWS configuration (environment,
    /// profile, or instance role).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket)
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<WriteReceipt> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(NDJSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| AppError::storage_write(&self.bucket, e.into_service_error()))?;

        log::info!("Wrote {} bytes to s3://{}/{}", size, self.bucket, key);

        Ok(WriteReceipt {
            kind: BackendKind::S3,
            target: self.bucket.clone(),
            key: key.to_string(),
            url: Some(format!("s3://{}/{}", self.bucket, key)),
        })
    }
}
