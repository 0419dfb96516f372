// src/pipeline/upload.rs

//! Push a handoff artifact's records into partitioned batch storage.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::read_envelope;
use crate::storage::{StorageWriter, WriteReceipt};

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub file_path: String,
    pub file_size: u64,
    pub file_size_kb: f64,
    pub record_count: usize,
    pub receipt: WriteReceipt,
    pub message: String,
}

/// Load the artifact at `path`, extract its records and write them as one
/// NDJSON batch. Unlike verification, a missing or corrupt artifact is
/// fatal here: there is nothing to upload.
pub async fn run_upload(
    writer: &StorageWriter,
    path: impl AsRef<Path>,
    destination: &str,
    prefix: &str,
) -> Result<UploadReport> {
    let path = path.as_ref();
    let (envelope, file_size) = read_envelope(path).await?;

    let records = match envelope["data"]["projects"].clone() {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };
    let record_count = records.len();

    let receipt = writer
        .write(destination, Value::Array(records), prefix)
        .await?;

    let location = receipt
        .url
        .clone()
        .unwrap_or_else(|| format!("{}/{}", receipt.target, receipt.key));
    let message = format!("Uploaded {record_count} records to {location}");
    log::info!("{message}");

    Ok(UploadReport {
        file_path: path.display().to_string(),
        file_size,
        file_size_kb: (file_size as f64 / 1024.0 * 100.0).round() / 100.0,
        record_count,
        receipt,
        message,
    })
}
