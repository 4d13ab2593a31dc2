//! # Filesystem-backed record store
//!
//! [`FileStore`] persists each record as a pretty-printed JSON file in a single
//! directory. The file holds the key alongside the value, so the key can always be
//! recovered from the document itself.
//!
//! Keys contain characters that are awkward in file names (`:`, `@`, `/`), so a
//! short key is named by its hex encoding. Keys longer than `MAX_HEX_KEY_BYTES`
//! would exceed the file-name limit once hex-encoded; they are named by the SHA-1
//! of the key instead.
//!
//! ```text
//! <base_dir>/
//! ├── 73747564656e743a....json   # "student:..."
//! ├── 757365723a....json         # "user:..."
//! └── sha1-3f2a....json          # any key over the hex limit
//! ```
//!
//! A prefix scan lists the directory, filters hex names by their decoded key and
//! reads hashed files to check theirs, so it is linear in the number of records.
//! Every write goes to its own temporary file in the same directory and is renamed
//! into place. Concurrent writers of one key therefore never share a file, and a
//! reader sees either the old or the new document in full.

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::record::{Record, RecordStore, StoreError};

const EXTENSION: &str = "json";
const HASHED_PREFIX: &str = "sha1-";

/// Longest key stored under its hex encoding.
const MAX_HEX_KEY_BYTES: usize = 100;

/// On-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    key: String,
    value: Value,
}

#[derive(Debug, PartialEq)]
enum FileName {
    /// Hex-named file; the key is known without opening it.
    Key(String),
    /// Hash-named file; the key is inside.
    Hashed,
}

/// Filesystem-backed RecordStore.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn file_name(key: &str) -> String {
        if key.len() <= MAX_HEX_KEY_BYTES {
            format!("{}.{}", hex::encode(key.as_bytes()), EXTENSION)
        } else {
            let digest = Sha1::digest(key.as_bytes());
            format!("{}{}.{}", HASHED_PREFIX, hex::encode(digest), EXTENSION)
        }
    }

    fn parse_file_name(name: &str) -> Option<FileName> {
        let stem = name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
        if stem.starts_with(HASHED_PREFIX) {
            return Some(FileName::Hashed);
        }
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok().map(FileName::Key)
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base.join(Self::file_name(key))
    }

    /// Read and decode one file. `label` names the record in errors.
    async fn read_file(&self, path: &Path, label: &str) -> Result<Option<StoredRecord>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: label.to_string(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: label.to_string(),
                source,
            })
    }
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let record = self.read_file(&self.record_path(key), key).await?;
        Ok(record.filter(|r| r.key == key).map(|r| r.value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        let document = StoredRecord {
            key: key.to_string(),
            value,
        };
        let bytes = serde_json::to_vec_pretty(&document).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        let dir = self.base.clone();
        let path = self.record_path(key);
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes))
            .await
            .map_err(|e| io_err(io::Error::other(e)))?
            .map_err(io_err)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let io_err = |source| StoreError::Io {
            key: format!("{prefix}*"),
            source,
        };

        let mut dir = match tokio::fs::read_dir(&self.base).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_err(source)),
        };

        let mut candidates = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(io_err)? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            match Self::parse_file_name(&name) {
                Some(FileName::Key(key)) if key.starts_with(prefix) => {
                    candidates.push((key, entry.path()))
                }
                Some(FileName::Hashed) => candidates.push((name, entry.path())),
                _ => {}
            }
        }

        let mut records = Vec::with_capacity(candidates.len());
        for (label, path) in candidates {
            // A record deleted between listing and reading is simply skipped.
            if let Some(stored) = self.read_file(&path, &label).await? {
                if stored.key.starts_with(prefix) {
                    records.push(Record {
                        key: stored.key,
                        value: stored.value,
                    });
                }
            }
        }
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}
