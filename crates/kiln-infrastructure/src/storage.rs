//! Shared disk-persistence helpers: atomic whole-file rewrites for the
//! Version Store / Finetuning Pool / hyperparameter files, and append-only
//! writes for the Feedback Store / hard-negative log (§5, §6 "Persisted
//! state layout").

use std::path::Path;

use kiln_domain::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;

/// Read and deserialize a JSON file, returning `default` if it doesn't
/// exist yet.
pub async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Error::from(e)),
    }
}

/// Serialize `value` and rewrite `path` atomically: write to a sibling
/// `.tmp` file, then rename over the destination, so a crash mid-write
/// never leaves a half-written file readable at `path` (§5 "disk writes
/// are atomic").
pub async fn write_json_atomic<T: Serialize + Sync>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Append one JSON-encoded line to `path`, creating it (and its parent
/// directory) if necessary.
pub async fn append_jsonl<T: Serialize + Sync>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(&line).await?;
    Ok(())
}

/// Read every line of an append-only JSONL file, skipping a trailing
/// partial/corrupt last record (§5 "partial last record tolerated on
/// read").
pub async fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::from(e)),
    };

    let mut records = Vec::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(_) => continue,
        }
    }
    Ok(records)
}
