//! # Document Store
//!
//! Collection-scoped CRUD plus snapshot subscriptions. Subscribers always get
//! the full current contents of a collection, never deltas, so consumers
//! rebuild their derived state from each snapshot.

pub mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No document {id} in collection {collection}")]
    NotFound { collection: String, id: String },
    #[error("Update for {id} must be a JSON object")]
    InvalidPatch { id: String },
    #[error("Failed to (de)serialize store data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A stored record with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Callback invoked with a collection's full snapshot.
pub type SnapshotListener = Box<dyn Fn(&[Document]) + Send + Sync>;

/// Live subscription handle. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A real-time document database, scoped by collection name.
pub trait DocumentStore {
    /// Stores `record` under a fresh id and returns the id.
    fn add(&self, collection: &str, record: Value) -> Result<String, StoreError>;

    /// Shallow-merges the fields of `patch` into the stored record.
    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Delivers the current snapshot right away and again after every change.
    fn subscribe(&self, collection: &str, on_change: SnapshotListener) -> Subscription;
}
