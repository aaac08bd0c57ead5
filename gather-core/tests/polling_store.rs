//! Screens against a store whose live queries are filled by a polling task,
//! the way the Firestore backend works.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gather_core::backend::memory::{MemoryBackend, MemoryStore};
use gather_core::backend::{AuthProvider, Backend, Document, DocumentStore, Fields};
use gather_core::live::LiveQuery;
use gather_core::screens::{EventScreen, FavoritesScreen};
use gather_core::{FAVORITES, GatherResult};

const POLL: Duration = Duration::from_millis(20);

/// Memory store whose subscriptions start empty and catch up on each poll.
struct PolledStore {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl DocumentStore for PolledStore {
    async fn insert(&self, collection: &str, fields: Fields) -> GatherResult<String> {
        self.inner.insert(collection, fields).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        self.inner.set(collection, id, fields).await
    }

    async fn get(&self, collection: &str, id: &str) -> GatherResult<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> GatherResult<()> {
        self.inner.delete(collection, id).await
    }

    async fn list(&self, collection: &str) -> GatherResult<Vec<Document>> {
        self.inner.list(collection).await
    }

    fn subscribe(&self, collection: &str) -> LiveQuery {
        let inner = self.inner.clone();
        let name = collection.to_string();
        LiveQuery::polling(collection.to_string(), POLL, move || {
            let inner = inner.clone();
            let name = name.clone();
            async move { inner.list(&name).await }
        })
    }
}

async fn setup() -> (MemoryBackend, Backend, String) {
    let memory = MemoryBackend::new();
    memory
        .auth
        .sign_up("alice@example.com", "secret1")
        .await
        .unwrap();

    let data = memory.backend().data();
    let id = data
        .create_event("Meetup", None, Some("Hall A"))
        .await
        .unwrap();
    data.set_favorite(&id, true).await;

    let polled = Backend::new(
        memory.auth.clone(),
        Arc::new(PolledStore {
            inner: memory.store.clone(),
        }),
    );
    (memory, polled, id)
}

#[tokio::test]
async fn event_screen_opens_with_stored_rows() {
    let (_memory, backend, id) = setup().await;

    let screen = EventScreen::open(backend.data()).await.unwrap();
    let rows = screen.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event.id, id);
    assert!(rows[0].is_favorite);
}

#[tokio::test]
async fn toggling_a_stored_favorite_removes_it() {
    let (memory, backend, id) = setup().await;
    let mut screen = EventScreen::open(backend.data()).await.unwrap();

    screen.toggle_favorite(&id).await;
    assert_eq!(memory.store.count(FAVORITES), 0);

    assert!(screen.refresh(Duration::from_secs(1)).await);
    assert!(!screen.rows()[0].is_favorite);

    screen.toggle_favorite(&id).await;
    assert_eq!(memory.store.count(FAVORITES), 1);
}

#[tokio::test]
async fn favorites_screen_opens_with_stored_rows() {
    let (_memory, backend, _id) = setup().await;

    let screen = FavoritesScreen::open(backend.data()).await.unwrap();
    assert_eq!(screen.rows().len(), 1);
}
