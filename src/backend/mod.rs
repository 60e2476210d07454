//! # Document Backend
//!
//! Abstraction over the hosted document database the dashboard consumes.
//! Collections deliver full snapshots on every change (never diffs), either
//! through one-shot reads or push subscriptions. The hosted service itself
//! stays external; [`memory::MemoryBackend`] implements the same contract
//! in-process for tests and demo runs.

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;

pub mod memory;

pub use memory::MemoryBackend;

/// One document: an id plus its field map.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Convenience accessor for a string field.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Equality filter on a single document field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub equals: Value,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.fields.get(&self.field) == Some(&self.equals)
    }
}

/// Ascending single-field ordering of a delivered snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
}

impl OrderBy {
    pub fn field(name: impl Into<String>) -> Self {
        Self { field: name.into() }
    }
}

/// One push delivery: the full current snapshot of the subscribed
/// collection, or an in-band delivery failure. On failure the consumer
/// keeps its last-known-good snapshot; there is no retry.
#[derive(Clone, Debug)]
pub enum SnapshotEvent {
    Snapshot(Vec<Document>),
    Error(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown collection {0:?}")]
    UnknownCollection(String),
    #[error("document {id:?} not found in {collection:?}")]
    DocumentNotFound { collection: String, id: String },
    #[error("malformed seed data: {0}")]
    MalformedSeed(String),
}

/// Live subscription to one collection. Dropping the handle (or calling
/// [`SubscriptionHandle::unsubscribe`]) cancels delivery, so a departed
/// view never leaks a push channel.
pub struct SubscriptionHandle {
    events: mpsc::Receiver<SnapshotEvent>,
    cancel: CancellationToken,
}

impl SubscriptionHandle {
    pub fn new(events: mpsc::Receiver<SnapshotEvent>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Wait for the next delivery. Returns `None` once the subscription is
    /// cancelled and the channel has drained.
    pub async fn next_event(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }

    /// Non-blocking poll, for callers driving their own loop.
    pub fn try_next(&mut self) -> Option<SnapshotEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// The document-collection contract the dashboard is written against.
///
/// Methods return boxed futures so the backend can live behind
/// `Arc<dyn DocumentBackend>` in the app state.
pub trait DocumentBackend: Send + Sync {
    /// Subscribe to a collection. The current snapshot is delivered
    /// immediately, then a full snapshot follows every change.
    fn subscribe(
        &self,
        collection: &str,
        filter: Option<FieldFilter>,
        order_by: Option<OrderBy>,
    ) -> SubscriptionHandle;

    /// One-shot read of a full collection.
    fn get_once<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Document>, BackendError>>;

    fn get_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Document, BackendError>>;

    /// Add a document with a backend-assigned id; returns the id.
    fn add_document<'a>(
        &'a self,
        collection: &'a str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'a, Result<String, BackendError>>;

    /// Create or replace the document with the given id.
    fn set_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'a, Result<(), BackendError>>;

    /// Delete a document. Deleting an absent document is not an error.
    fn delete_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>>;
}
