//! In-process backend.
//!
//! Behaves like the managed services closely enough for the app to run end to
//! end: accounts with passwords and a single signed-in user, plus collections
//! that publish a fresh snapshot after every write.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use super::{AuthProvider, Backend, Document, DocumentStore, Fields};
use crate::error::{AuthError, GatherError, GatherResult};
use crate::live::{LiveQuery, Snapshot};
use crate::model::Identity;

/// Same floor the hosted provider enforces.
const MIN_PASSWORD_LEN: usize = 6;

/// Memory auth provider and store, kept as concrete types so tests can reach
/// the failure switches on [`MemoryStore`].
#[derive(Clone, Default)]
pub struct MemoryBackend {
    pub auth: Arc<MemoryAuth>,
    pub store: Arc<MemoryStore>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> Backend {
        Backend::new(self.auth.clone(), self.store.clone())
    }
}

// =============================================================================
// Auth
// =============================================================================

struct Account {
    uid: String,
    email: String,
    password: String,
}

#[derive(Default)]
pub struct MemoryAuth {
    /// Keyed by lowercased email.
    accounts: Mutex<HashMap<String, Account>>,
    current: RwLock<Option<Identity>>,
    sign_ups: Mutex<usize>,
}

impl MemoryAuth {
    /// Number of sign-up requests that reached the provider.
    pub fn sign_up_requests(&self) -> usize {
        *self.sign_ups.lock()
    }
}

/// The provider's own loose check: something on both sides of a single `@`.
fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        *self.sign_ups.lock() += 1;

        if !plausible_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let identity = {
            let mut accounts = self.accounts.lock();
            let key = email.to_lowercase();
            if accounts.contains_key(&key) {
                return Err(AuthError::EmailInUse);
            }
            let account = Account {
                uid: uuid::Uuid::new_v4().simple().to_string(),
                email: email.to_string(),
                password: password.to_string(),
            };
            let identity = Identity {
                uid: account.uid.clone(),
                email: account.email.clone(),
            };
            accounts.insert(key, account);
            identity
        };

        *self.current.write() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if !plausible_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let identity = {
            let accounts = self.accounts.lock();
            let account = accounts
                .get(&email.to_lowercase())
                .ok_or(AuthError::UserNotFound)?;
            if account.password != password {
                return Err(AuthError::WrongPassword);
            }
            Identity {
                uid: account.uid.clone(),
                email: account.email.clone(),
            }
        };

        *self.current.write() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> GatherResult<()> {
        *self.current.write() = None;
        Ok(())
    }

    fn current_user(&self) -> Option<Identity> {
        self.current.read().clone()
    }
}

// =============================================================================
// Store
// =============================================================================

struct Collection {
    docs: Vec<Document>,
    tx: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Collection {
            docs: Vec::new(),
            tx,
        }
    }

    fn publish(&self) {
        self.tx.send_replace(Arc::new(self.docs.clone()));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
    offline: AtomicBool,
    /// Writes allowed before the store starts failing; `None` means unlimited.
    write_budget: Mutex<Option<usize>>,
}

impl MemoryStore {
    /// Make every read and write fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Allow `writes` more successful writes, then fail the rest.
    pub fn fail_after_writes(&self, writes: Option<usize>) {
        *self.write_budget.lock() = writes;
    }

    /// Number of documents currently in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, |c| c.docs.len())
    }

    fn check_online(&self) -> GatherResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatherError::Backend("store unavailable".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> GatherResult<()> {
        self.check_online()?;
        let mut budget = self.write_budget.lock();
        match budget.as_mut() {
            Some(0) => Err(GatherError::Backend("write rejected".into())),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn with_collection<R>(&self, collection: &str, f: impl FnOnce(&mut Collection) -> R) -> R {
        let mut collections = self.collections.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        f(entry)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, fields: Fields) -> GatherResult<String> {
        self.check_write()?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.with_collection(collection, |c| {
            c.docs.push(Document::new(&id, fields));
            c.publish();
        });
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        self.check_write()?;
        self.with_collection(collection, |c| {
            match c.docs.iter_mut().find(|d| d.id == id) {
                Some(doc) => doc.fields = fields,
                None => c.docs.push(Document::new(id, fields)),
            }
            c.publish();
        });
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> GatherResult<Option<Document>> {
        self.check_online()?;
        Ok(self.with_collection(collection, |c| {
            c.docs.iter().find(|d| d.id == id).cloned()
        }))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        self.check_write()?;
        self.with_collection(collection, |c| {
            let doc = c.docs.iter_mut().find(|d| d.id == id).ok_or_else(|| {
                GatherError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                }
            })?;
            doc.fields.extend(fields);
            c.publish();
            Ok(())
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> GatherResult<()> {
        self.check_write()?;
        self.with_collection(collection, |c| {
            let before = c.docs.len();
            c.docs.retain(|d| d.id != id);
            if c.docs.len() != before {
                c.publish();
            }
        });
        Ok(())
    }

    async fn list(&self, collection: &str) -> GatherResult<Vec<Document>> {
        self.check_online()?;
        Ok(self.with_collection(collection, |c| c.docs.clone()))
    }

    fn subscribe(&self, collection: &str) -> LiveQuery {
        let mut rx = self.with_collection(collection, |c| c.tx.subscribe());
        // Deliver the current contents as the first change, like a fresh listener.
        rx.mark_changed();
        LiveQuery::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let auth = MemoryAuth::default();
        let created = auth.sign_up("a@example.com", "secret1").await.unwrap();
        assert_eq!(auth.current_user(), Some(created.clone()));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current_user(), None);

        let signed_in = auth.sign_in("A@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[tokio::test]
    async fn auth_failures() {
        let auth = MemoryAuth::default();
        auth.sign_up("a@example.com", "secret1").await.unwrap();

        assert_eq!(
            auth.sign_up("a@example.com", "secret2").await,
            Err(AuthError::EmailInUse)
        );
        assert_eq!(
            auth.sign_up("b@example.com", "12345").await,
            Err(AuthError::WeakPassword)
        );
        assert_eq!(
            auth.sign_up("no-at-sign", "secret1").await,
            Err(AuthError::InvalidEmail)
        );
        assert_eq!(
            auth.sign_in("a@example.com", "nope").await,
            Err(AuthError::WrongPassword)
        );
        assert_eq!(
            auth.sign_in("x@example.com", "secret1").await,
            Err(AuthError::UserNotFound)
        );
        assert_eq!(auth.sign_up_requests(), 4);
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let store = MemoryStore::default();
        let id = store.insert("things", fields(json!({"a": 1}))).await.unwrap();

        store
            .update("things", &id, fields(json!({"b": 2})))
            .await
            .unwrap();
        let doc = store.get("things", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields, fields(json!({"a": 1, "b": 2})));

        store.set("things", &id, fields(json!({"c": 3}))).await.unwrap();
        assert_eq!(store.list("things").await.unwrap()[0].fields, fields(json!({"c": 3})));

        store.delete("things", &id).await.unwrap();
        assert_eq!(store.count("things"), 0);
        // Missing documents delete quietly.
        store.delete("things", &id).await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryStore::default();
        let err = store.update("things", "nope", Fields::new()).await.unwrap_err();
        assert!(matches!(err, GatherError::NotFound { .. }));
    }

    #[tokio::test]
    async fn subscribers_get_current_then_changes() {
        let store = MemoryStore::default();
        store.insert("things", Fields::new()).await.unwrap();

        let mut query = store.subscribe("things");
        assert_eq!(query.changed().await.unwrap().len(), 1);

        store.insert("things", Fields::new()).await.unwrap();
        assert_eq!(query.changed().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn offline_and_write_budget() {
        let store = MemoryStore::default();
        store.set_offline(true);
        assert!(store.list("things").await.is_err());
        store.set_offline(false);

        store.fail_after_writes(Some(1));
        assert!(store.insert("things", Fields::new()).await.is_ok());
        assert!(store.insert("things", Fields::new()).await.is_err());
        store.fail_after_writes(None);
        assert!(store.insert("things", Fields::new()).await.is_ok());
    }
}
