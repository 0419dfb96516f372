// src/storage/mod.rs

//! Destination-agnostic partitioned batch storage.
//!
//! One descriptor string selects the backend: the `LOCAL` sentinel, a
//! `file://` URI, or anything else as an object-store bucket name. The
//! descriptor is resolved exactly once into a [`Destination`], then every
//! backend honors the same contract: put the full payload under a generated
//! partition key and report where it landed.

pub mod key;

mod fs;
#[cfg(feature = "s3")]
mod s3;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::config::UploadConfig;
use crate::error::{AppError, Result};

pub use fs::FileStore;
pub use key::{KeyStrategy, partitioned_key};
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Resolved write destination. The descriptor grammar is closed; nothing
/// else disambiguates backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Configured local output root (the LOCAL sentinel)
    Local(PathBuf),

    /// Filesystem root taken from a file:// URI
    FileRoot(PathBuf),

    /// Object-store bucket
    Bucket(String),
}

impl Destination {
    /// Resolve a descriptor string. `local_root` supplies the root directory
    /// the LOCAL sentinel maps to.
    pub fn parse(descriptor: &str, local_root: Option<&str>) -> Result<Self> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(AppError::MissingDestinationConfig(
                "empty destination descriptor".into(),
            ));
        }

        if descriptor == "LOCAL" {
            let root = local_root
                .map(str::trim)
                .filter(|root| !root.is_empty())
                .ok_or(AppError::MissingLocalRoot)?;
            return Ok(Self::Local(PathBuf::from(root)));
        }

        if let Some(rest) = descriptor.strip_prefix("file://") {
            if rest.trim().is_empty() {
                return Err(AppError::MissingDestinationConfig(
                    "file:// destination has no path".into(),
                ));
            }
            // Relative roots are anchored to the working directory
            let root = std::path::absolute(rest)?;
            return Ok(Self::FileRoot(root));
        }

        Ok(Self::Bucket(descriptor.to_string()))
    }
}

/// Backend family that served a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    File,
    S3,
}

/// Where a batch landed.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReceipt {
    /// Backend family
    #[serde(rename = "type")]
    pub kind: BackendKind,

    /// Resolved root: a directory path or a bucket name
    pub target: String,

    /// Partition key relative to the target
    pub key: String,

    /// Fully qualified locator, for backends that have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Minimal write contract each backend implements.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write the full payload under the given relative key.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<WriteReceipt>;
}

/// Encode records as newline-delimited JSON: one compact object per line,
/// a newline after every record. Top-level object/array field values are
/// flattened to their compact JSON text so each line stays a flat record.
pub fn to_ndjson(records: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        let line = match record {
            Value::Object(fields) => {
                let mut flat = serde_json::Map::with_capacity(fields.len());
                for (name, value) in fields {
                    let coerced = match value {
                        Value::Object(_) | Value::Array(_) => {
                            Value::String(serde_json::to_string(value)?)
                        }
                        primitive => primitive.clone(),
                    };
                    flat.insert(name.clone(), coerced);
                }
                serde_json::to_string(&Value::Object(flat))?
            }
            other => serde_json::to_string(other)?,
        };
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

/// Partitioned batch writer over all destinations.
#[derive(Debug, Clone)]
pub struct StorageWriter {
    strategy: KeyStrategy,
    local_root: Option<String>,
}

impl StorageWriter {
    pub fn new(strategy: KeyStrategy, local_root: Option<String>) -> Self {
        Self {
            strategy,
            local_root,
        }
    }

    /// Build a writer from upload configuration, honoring the
    /// LOCAL_OUTPUT_DIR environment override for the LOCAL root.
    pub fn from_config(upload: &UploadConfig) -> Self {
        Self::new(upload.key_strategy, upload.effective_local_root())
    }

    /// Write a batch of records to `descriptor` under a fresh partition key.
    /// A single JSON object is treated as a one-record batch.
    pub async fn write(
        &self,
        descriptor: &str,
        data: Value,
        prefix: &str,
    ) -> Result<WriteReceipt> {
        let records = match data {
            Value::Array(items) => items,
            single => vec![single],
        };

        let payload = to_ndjson(&records)?;
        let key = partitioned_key(prefix, Utc::now(), "json", self.strategy);
        let destination = Destination::parse(descriptor, self.local_root.as_deref())?;

        log::info!(
            "Writing {} records ({} bytes) to {:?} under {}",
            records.len(),
            payload.len(),
            destination,
            key
        );

        let store: Box<dyn BlobStore> = match destination {
            Destination::Local(root) | Destination::FileRoot(root) => {
                Box::new(FileStore::new(root))
            }
            #[cfg(feature = "s3")]
            Destination::Bucket(bucket) => Box::new(S3Store::from_env(bucket).await),
            #[cfg(not(feature = "s3"))]
            Destination::Bucket(bucket) => {
                return Err(AppError::MissingDestinationConfig(format!(
                    "object-store destination '{bucket}' requires the s3 feature"
                )));
            }
        };

        store.put(&key, payload).await
    }
}
