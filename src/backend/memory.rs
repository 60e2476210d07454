//! In-process implementation of [`DocumentBackend`] with the same
//! snapshot-replace push semantics as the hosted service: every mutation
//! re-delivers the full filtered, ordered collection to each subscriber.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{
    BackendError, Document, DocumentBackend, FieldFilter, OrderBy, SnapshotEvent,
    SubscriptionHandle,
};

const SUBSCRIPTION_BUFFER: usize = 32;

struct Subscriber {
    collection: String,
    filter: Option<FieldFilter>,
    order_by: Option<OrderBy>,
    sender: mpsc::Sender<SnapshotEvent>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

/// In-memory document store with push subscriptions.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document with an explicit id, creating the collection if
    /// needed. Used by seeding and tests, where cross-collection foreign
    /// keys require known ids.
    pub fn insert(&self, collection: &str, doc: Document) {
        {
            let mut inner = self.lock();
            let docs = inner.collections.entry(collection.to_string()).or_default();
            if let Some(existing) = docs.iter_mut().find(|d| d.id == doc.id) {
                *existing = doc;
            } else {
                docs.push(doc);
            }
        }
        self.notify(collection);
    }

    /// Populate collections from a seed value shaped as
    /// `{ "Reports": [ { "id": "...", ...fields }, ... ], ... }`.
    /// The `id` key is optional; absent ids are assigned.
    pub fn seed_from_json(&self, root: &Value) -> Result<usize, BackendError> {
        let collections = root
            .as_object()
            .ok_or_else(|| BackendError::MalformedSeed("top level must be an object".into()))?;

        let mut inserted = 0;
        for (collection, docs) in collections {
            let docs = docs.as_array().ok_or_else(|| {
                BackendError::MalformedSeed(format!("collection {collection:?} must be an array"))
            })?;
            for entry in docs {
                let mut fields = entry
                    .as_object()
                    .ok_or_else(|| {
                        BackendError::MalformedSeed(format!(
                            "documents in {collection:?} must be objects"
                        ))
                    })?
                    .clone();
                let id = match fields.remove("id") {
                    Some(Value::String(id)) => id,
                    Some(other) => {
                        return Err(BackendError::MalformedSeed(format!(
                            "document id in {collection:?} must be a string, got {other}"
                        )))
                    }
                    None => self.assign_id(),
                };
                self.insert(collection, Document::new(id, fields));
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn assign_id(&self) -> String {
        let mut inner = self.lock();
        inner.next_id += 1;
        format!("doc-{:04}", inner.next_id)
    }

    fn view(
        inner: &Inner,
        collection: &str,
        filter: Option<&FieldFilter>,
        order_by: Option<&OrderBy>,
    ) -> Vec<Document> {
        let mut docs: Vec<Document> = inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order_by {
            docs.sort_by(|a, b| compare_fields(a.fields.get(&order.field), b.fields.get(&order.field)));
        }
        docs
    }

    /// Re-deliver the collection to every live subscriber. Closed or
    /// cancelled subscribers are dropped here.
    fn notify(&self, collection: &str) {
        let mut inner = self.lock();
        inner.subscribers.retain(|sub| !sub.cancel.is_cancelled());

        let snapshots: Vec<(mpsc::Sender<SnapshotEvent>, Vec<Document>)> = inner
            .subscribers
            .iter()
            .filter(|sub| sub.collection == collection)
            .map(|sub| {
                let view = Self::view(
                    &inner,
                    collection,
                    sub.filter.as_ref(),
                    sub.order_by.as_ref(),
                );
                (sub.sender.clone(), view)
            })
            .collect();
        drop(inner);

        for (sender, view) in snapshots {
            if sender.try_send(SnapshotEvent::Snapshot(view)).is_err() {
                tracing::warn!(collection, "dropping snapshot for a lagging subscriber");
            }
        }
    }
}

/// Snapshot ordering: strings lexicographic, numbers by value, everything
/// else keeps insertion order. Report timestamps are RFC 3339 strings, so
/// string comparison matches chronological order.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

impl DocumentBackend for MemoryBackend {
    fn subscribe(
        &self,
        collection: &str,
        filter: Option<FieldFilter>,
        order_by: Option<OrderBy>,
    ) -> SubscriptionHandle {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let cancel = CancellationToken::new();

        let mut inner = self.lock();
        let initial = Self::view(&inner, collection, filter.as_ref(), order_by.as_ref());
        let _ = sender.try_send(SnapshotEvent::Snapshot(initial));
        inner.subscribers.push(Subscriber {
            collection: collection.to_string(),
            filter,
            order_by,
            sender,
            cancel: cancel.clone(),
        });

        SubscriptionHandle::new(receiver, cancel)
    }

    fn get_once<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Document>, BackendError>> {
        let inner = self.lock();
        let docs = Self::view(&inner, collection, None, None);
        drop(inner);
        async move { Ok(docs) }.boxed()
    }

    fn get_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Document, BackendError>> {
        let inner = self.lock();
        let found = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned());
        drop(inner);
        async move {
            found.ok_or_else(|| BackendError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
        }
        .boxed()
    }

    fn add_document<'a>(
        &'a self,
        collection: &'a str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        let id = self.assign_id();
        self.insert(collection, Document::new(id.clone(), fields));
        async move { Ok(id) }.boxed()
    }

    fn set_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        fields: Map<String, Value>,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        self.insert(collection, Document::new(id, fields));
        async move { Ok(()) }.boxed()
    }

    fn delete_document<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        let removed = {
            let mut inner = self.lock();
            match inner.collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|doc| doc.id != id);
                    docs.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.notify(collection);
        }
        async move { Ok(()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    fn expect_snapshot(event: Option<SnapshotEvent>) -> Vec<Document> {
        match event {
            Some(SnapshotEvent::Snapshot(docs)) => docs,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_snapshot() {
        let backend = MemoryBackend::new();
        backend.insert("Categories", Document::new("c1", fields(json!({"name": "Trash"}))));

        let mut sub = backend.subscribe("Categories", None, None);
        let docs = expect_snapshot(sub.next_event().await);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "c1");
    }

    #[tokio::test]
    async fn test_mutation_pushes_full_snapshot() {
        let backend = MemoryBackend::new();
        let mut sub = backend.subscribe("Reports", None, None);
        assert_eq!(expect_snapshot(sub.next_event().await).len(), 0);

        let id = backend
            .add_document("Reports", fields(json!({"description": "bin full"})))
            .await
            .unwrap();
        assert_eq!(expect_snapshot(sub.next_event().await).len(), 1);

        backend.delete_document("Reports", &id).await.unwrap();
        assert_eq!(expect_snapshot(sub.next_event().await).len(), 0);
    }

    #[tokio::test]
    async fn test_filter_and_order() {
        let backend = MemoryBackend::new();
        backend.insert(
            "Reports",
            Document::new(
                "r2",
                fields(json!({"categoryID": "trash", "reportTime": "2025-07-25T12:00:00Z"})),
            ),
        );
        backend.insert(
            "Reports",
            Document::new(
                "r1",
                fields(json!({"categoryID": "trash", "reportTime": "2025-07-25T09:00:00Z"})),
            ),
        );
        backend.insert(
            "Reports",
            Document::new(
                "r3",
                fields(json!({"categoryID": "crowd", "reportTime": "2025-07-25T10:00:00Z"})),
            ),
        );

        let mut sub = backend.subscribe(
            "Reports",
            Some(FieldFilter::equals("categoryID", "trash")),
            Some(OrderBy::field("reportTime")),
        );
        let docs = expect_snapshot(sub.next_event().await);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_unsubscribed_handle_receives_nothing_further() {
        let backend = MemoryBackend::new();
        let mut sub = backend.subscribe("Reports", None, None);
        let _ = sub.next_event().await;

        sub.unsubscribe();
        backend
            .add_document("Reports", fields(json!({"description": "late"})))
            .await
            .unwrap();

        // The subscriber list is pruned on notify, so nothing was queued.
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn test_get_document_missing_is_an_error() {
        let backend = MemoryBackend::new();
        let err = backend.get_document("Users", "nobody").await.unwrap_err();
        assert!(matches!(err, BackendError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_document_upserts() {
        let backend = MemoryBackend::new();
        backend
            .set_document("Booths", "b1", fields(json!({"tag": "A1"})))
            .await
            .unwrap();
        backend
            .set_document("Booths", "b1", fields(json!({"tag": "A2"})))
            .await
            .unwrap();

        let docs = backend.get_once("Booths").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].str_field("tag"), Some("A2"));
    }

    #[test]
    fn test_seed_from_json() {
        let backend = MemoryBackend::new();
        let inserted = backend
            .seed_from_json(&json!({
                "Categories": [
                    {"id": "cat-trash", "name": "Trash"},
                    {"name": "Crowd"},
                ],
            }))
            .unwrap();
        assert_eq!(inserted, 2);

        let inner = backend.lock();
        let docs = inner.collections.get("Categories").unwrap();
        assert_eq!(docs[0].id, "cat-trash");
        assert_ne!(docs[1].id, "");
    }

    #[test]
    fn test_seed_rejects_non_object_documents() {
        let backend = MemoryBackend::new();
        let err = backend.seed_from_json(&json!({"Reports": [1, 2]})).unwrap_err();
        assert!(matches!(err, BackendError::MalformedSeed(_)));
    }
}
