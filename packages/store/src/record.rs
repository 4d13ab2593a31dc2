//! The [`RecordStore`] trait and its error type.

use async_trait::async_trait;
use serde_json::Value;

/// A key and the JSON document stored under it, as returned by a prefix scan.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored record {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Async key-value storage of JSON documents.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the document stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous document.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Every record whose key starts with `prefix`, ordered by key.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<Record>, StoreError>;
}

/// Typed helpers over any [`RecordStore`].
///
/// Decoding failures surface as [`StoreError::Corrupt`] against the offending key.
pub async fn get_json<T>(store: &dyn RecordStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub async fn set_json<T>(store: &dyn RecordStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: serde::Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await
}

pub async fn scan_json<T>(store: &dyn RecordStore, prefix: &str) -> Result<Vec<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    store
        .scan_prefix(prefix)
        .await?
        .into_iter()
        .map(|record| {
            serde_json::from_value(record.value).map_err(|source| StoreError::Corrupt {
                key: record.key,
                source,
            })
        })
        .collect()
}
