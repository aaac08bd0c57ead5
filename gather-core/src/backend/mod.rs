//! Managed backend abstraction.
//!
//! The application never owns data: identities live in an [`AuthProvider`] and
//! every record lives in a [`DocumentStore`]. A [`Backend`] bundles one of each
//! and is cheap to clone.
//!
//! Two implementations ship with the crate:
//! - [`memory`]: in-process, used by tests and `backend = "memory"`
//! - [`firebase`]: Firebase Auth + Firestore over their REST APIs

pub mod firebase;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{BackendKind, GatherConfig};
use crate::data::DataAccess;
use crate::error::{AuthError, GatherError, GatherResult};
use crate::live::LiveQuery;
use crate::model::Identity;

/// Document body: a JSON object of field name to value.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A stored document with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: &str, fields: Fields) -> Self {
        Document {
            id: id.to_string(),
            fields,
        }
    }

    /// Deserialize the document body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> GatherResult<T> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone()))
            .map_err(|e| GatherError::Serialization(format!("document {}: {}", self.id, e)))
    }
}

/// Serialize a typed record into document fields.
pub fn to_fields<T: Serialize>(value: &T) -> GatherResult<Fields> {
    match serde_json::to_value(value).map_err(|e| GatherError::Serialization(e.to_string()))? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(GatherError::Serialization(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Email/password authentication.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an identity and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> GatherResult<()>;

    /// The signed-in identity, if any. Available synchronously once signed in.
    fn current_user(&self) -> Option<Identity>;
}

/// Collection-based document storage with live queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under a generated id and return that id.
    async fn insert(&self, collection: &str, fields: Fields) -> GatherResult<String>;

    /// Create or replace the document with the given id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()>;

    async fn get(&self, collection: &str, id: &str) -> GatherResult<Option<Document>>;

    /// Merge `fields` into an existing document. Fails with `NotFound` if it is missing.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> GatherResult<()>;

    async fn list(&self, collection: &str) -> GatherResult<Vec<Document>>;

    /// Open a live query over the whole collection.
    fn subscribe(&self, collection: &str) -> LiveQuery;
}

/// Connected auth provider and document store.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Backend {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Backend { auth, store }
    }

    /// Fresh in-process backend with no users and no documents.
    pub fn in_memory() -> Self {
        memory::MemoryBackend::new().backend()
    }

    /// Connect to the backend selected in the configuration.
    pub fn connect(config: &GatherConfig) -> GatherResult<Self> {
        match config.backend {
            BackendKind::Memory => {
                tracing::debug!("using in-memory backend");
                Ok(Self::in_memory())
            }
            BackendKind::Firebase => {
                let firebase = config.firebase.as_ref().ok_or_else(|| {
                    GatherError::Config("backend = \"firebase\" requires a [firebase] section".into())
                })?;
                firebase::FirebaseBackend::connect(firebase)
            }
        }
    }

    pub fn data(&self) -> DataAccess {
        DataAccess::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_fields_rejects_non_objects() {
        assert!(to_fields(&"just a string").is_err());
        let fields = to_fields(&json!({"a": 1})).unwrap();
        assert_eq!(fields.get("a"), Some(&json!(1)));
    }

    #[test]
    fn decode_reports_document_id() {
        let doc = Document::new("broken", Fields::new());
        let err = doc.decode::<crate::model::Favorite>().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn firebase_backend_needs_firebase_section() {
        let config = GatherConfig {
            backend: BackendKind::Firebase,
            firebase: None,
        };
        assert!(matches!(
            Backend::connect(&config),
            Err(GatherError::Config(_))
        ));
    }
}
