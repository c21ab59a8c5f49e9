//! Content and commit-metadata serialization handed to every adapter.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// Encodes and decodes one payload type for storage.
pub trait Serializer<T>: Send + Sync {
    fn to_bytes(&self, value: &T) -> StoreResult<Vec<u8>>;
    fn from_bytes(&self, bytes: &[u8]) -> StoreResult<T>;
}

/// JSON encoding via `serde_json`.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for JsonSerializer<T> {
    fn to_bytes(&self, value: &T) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn from_bytes(&self, bytes: &[u8]) -> StoreResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A piece of structured content stored under a key in a commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contents {
    pub id: String,
    pub payload: serde_json::Value,
}

/// Metadata attached to every commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub committer: String,
    pub author: String,
    pub message: String,
    pub commit_time_ms: u64,
}

/// The pair of serializers a store uses for contents and commit metadata.
#[derive(Clone)]
pub struct StoreWorker {
    values: Arc<dyn Serializer<Contents>>,
    metadata: Arc<dyn Serializer<CommitMeta>>,
}

impl StoreWorker {
    pub fn new(
        values: Arc<dyn Serializer<Contents>>,
        metadata: Arc<dyn Serializer<CommitMeta>>,
    ) -> Self {
        Self { values, metadata }
    }

    /// JSON for both contents and metadata.
    pub fn json() -> Self {
        Self::new(
            Arc::new(JsonSerializer::<Contents>::new()),
            Arc::new(JsonSerializer::<CommitMeta>::new()),
        )
    }

    pub fn value_serializer(&self) -> Arc<dyn Serializer<Contents>> {
        Arc::clone(&self.values)
    }

    pub fn metadata_serializer(&self) -> Arc<dyn Serializer<CommitMeta>> {
        Arc::clone(&self.metadata)
    }
}

impl Default for StoreWorker {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for StoreWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreWorker").finish_non_exhaustive()
    }
}
