// src/storage/key.rs

//! Date-partitioned storage key generation.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Leaf naming strategy for partition keys.
///
/// `Random` is the only strategy that is safe when concurrent writers share
/// a prefix; `Timestamp` collides for writes landing in the same second and
/// survives only for compatibility with older layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    #[default]
    Random,
    Timestamp,
}

/// Compose a partition key `{prefix}/year=YYYY/month=MM/day=DD/{leaf}.{ext}`
/// for the given UTC instant.
pub fn partitioned_key(
    prefix: &str,
    instant: DateTime<Utc>,
    ext: &str,
    strategy: KeyStrategy,
) -> String {
    let leaf = match strategy {
        KeyStrategy::Random => uuid::Uuid::new_v4().simple().to_string(),
        KeyStrategy::Timestamp => instant.format("%Y%m%dT%H%M%S").to_string(),
    };

    format!(
        "{}/year={:04}/month={:02}/day={:02}/{}.{}",
        sanitize_prefix(prefix),
        instant.year(),
        instant.month(),
        instant.day(),
        leaf,
        ext
    )
}

/// Drop empty, `.` and `..` segments so a crafted prefix can never climb out
/// of the resolved storage root. A prefix with nothing left falls back to
/// `data`.
fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: Vec<&str> = prefix
        .split('/')
        .map(str::trim)
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect();

    if cleaned.is_empty() {
        "data".to_string()
    } else {
        cleaned.join("/")
    }
}
