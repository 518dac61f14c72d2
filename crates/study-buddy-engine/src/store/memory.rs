use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use super::{Document, DocumentStore, SnapshotListener, StoreError, Subscription};

type Listener = Arc<dyn Fn(&[Document]) + Send + Sync>;

/// A snapshot owed to one or more listeners.
#[derive(Debug, PartialEq)]
enum Delivery {
    /// Every listener of the collection.
    Collection(String),
    /// The first snapshot of a new subscription.
    Initial(u64),
}

#[derive(Default)]
struct Inner {
    /// Documents per collection, in insertion order.
    collections: BTreeMap<String, Vec<Document>>,
    listeners: BTreeMap<u64, (String, Listener)>,
    next_listener: u64,
    queue: VecDeque<Delivery>,
    /// Set while some thread is draining `queue`.
    delivering: bool,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    /// Reads the snapshot for `delivery` as it is right now.
    fn batch(&self, delivery: &Delivery) -> (Vec<Document>, Vec<Listener>) {
        match delivery {
            Delivery::Collection(collection) => {
                let listeners = self
                    .listeners
                    .values()
                    .filter(|(c, _)| c == collection)
                    .map(|(_, l)| Arc::clone(l))
                    .collect();
                (self.snapshot(collection), listeners)
            }
            Delivery::Initial(key) => match self.listeners.get(key) {
                Some((collection, listener)) => {
                    (self.snapshot(collection), vec![Arc::clone(listener)])
                }
                None => (Vec::new(), Vec::new()),
            },
        }
    }
}

/// In-process document store.
///
/// Clones share the same data. Listeners run outside the internal lock, one
/// delivery at a time: a change made while another thread (or a listener) is
/// delivering is queued and delivered by that same thread. Each delivery reads
/// the collection as it is when the listener is called, so the last snapshot a
/// listener sees is always the current one.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store previously written by [`MemoryStore::save_to_path`].
    ///
    /// A missing file gives an empty store.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let collections: BTreeMap<String, Vec<Document>> = serde_json::from_str(&content)?;
        let store = Self::new();
        store.lock().collections = collections;
        Ok(store)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.lock().collections)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Current contents of `collection`.
    pub fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.lock().snapshot(collection)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, delivery: Delivery) {
        {
            let mut inner = self.lock();
            if !inner.queue.contains(&delivery) {
                inner.queue.push_back(delivery);
            }
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        loop {
            let (snapshot, listeners) = {
                let mut inner = self.lock();
                let Some(delivery) = inner.queue.pop_front() else {
                    inner.delivering = false;
                    return;
                };
                inner.batch(&delivery)
            };
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn add(&self, collection: &str, record: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                data: record,
            });
        log::debug!("Added {collection}/{id}");
        self.notify(Delivery::Collection(collection.to_string()));
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::InvalidPatch { id: id.to_string() });
        };
        {
            let mut inner = self.lock();
            let doc = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            match &mut doc.data {
                Value::Object(existing) => existing.extend(fields),
                other => *other = Value::Object(fields),
            }
        }
        self.notify(Delivery::Collection(collection.to_string()));
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = self
            .lock()
            .collections
            .get_mut(collection)
            .and_then(|docs| {
                let pos = docs.iter().position(|d| d.id == id)?;
                Some(docs.remove(pos))
            });
        if removed.is_none() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        log::debug!("Deleted {collection}/{id}");
        self.notify(Delivery::Collection(collection.to_string()));
        Ok(())
    }

    fn subscribe(&self, collection: &str, on_change: SnapshotListener) -> Subscription {
        let key = {
            let mut inner = self.lock();
            let key = inner.next_listener;
            inner.next_listener += 1;
            inner
                .listeners
                .insert(key, (collection.to_string(), Arc::from(on_change)));
            key
        };
        self.notify(Delivery::Initial(key));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .remove(&key);
            }
        })
    }
}
