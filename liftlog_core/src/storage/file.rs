//! File-backed storage provider.
//!
//! Each key maps to one JSON document under a root directory, with the
//! namespace segments of the key becoming subdirectories. Writes are atomic:
//! the document is written to a unique temp file in the target directory
//! under an exclusive lock, fsynced, then renamed over the previous version.
//! Reads take a shared lock. All filesystem work runs on the blocking pool.

use super::Store;
use crate::{Error, Result};
use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A `Store` keeping one JSON file per key under a root directory
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to its backing file path.
    ///
    /// Key segments become directory components, so they are restricted to
    /// ascii alphanumerics, `.`, `_` and `-`, and may not be empty or `..`.
    /// Anything else is rejected before it can escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(Error::Storage("empty storage key".into()));
        }

        let mut path = self.root.clone();
        let mut segments = key.split('/').peekable();
        while let Some(segment) = segments.next() {
            let valid = !segment.is_empty()
                && segment != ".."
                && !segment.starts_with('.')
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
            if !valid {
                return Err(Error::Storage(format!(
                    "invalid storage key segment '{segment}' in key '{key}'"
                )));
            }
            // The filename gets the .json suffix appended (not set_extension,
            // which would eat part of a dotted segment like a date)
            if segments.peek().is_none() {
                path.push(format!("{segment}.json"));
            } else {
                path.push(segment);
            }
        }

        Ok(path)
    }
}

/// Read one document under a shared lock.
///
/// A document that fails to parse is logged and treated as absent; one
/// corrupt file must not take down every caller of the store.
fn read_value(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    let read_result = reader.read_to_string(&mut contents);
    file.unlock()?;
    read_result?;

    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("corrupt document at {:?}: {}. Treating as absent.", path, e);
            Ok(None)
        }
    }
}

/// Write one document atomically: temp file, exclusive lock, fsync, rename
fn write_value(path: &Path, value: &Value) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Storage(format!("key path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}

fn remove_value(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn clear_root(root: &Path) -> Result<()> {
    if root.exists() {
        std::fs::remove_dir_all(root)?;
    }
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Walk the root collecting `.json` documents back into keys
fn collect_keys(root: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_keys(root, &path, keys)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let relative = path
                .with_extension("")
                .strip_prefix(root)
                .map_err(|e| Error::Storage(format!("stray file outside root: {e}")))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(relative);
        }
    }

    Ok(())
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Storage(format!("blocking storage task failed: {e}")))?
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        run_blocking(move || read_value(&path)).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        run_blocking(move || write_value(&path, &value)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        run_blocking(move || remove_value(&path)).await
    }

    async fn clear(&self) -> Result<()> {
        let root = self.root.clone();
        run_blocking(move || clear_root(&root)).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        run_blocking(move || {
            let mut keys = Vec::new();
            collect_keys(&root, &root, &mut keys)?;
            Ok(keys)
        })
        .await
    }
}
