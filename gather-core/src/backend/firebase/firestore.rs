//! Firestore over its REST API.
//!
//! REST has no listen channel, so live queries poll the collection and publish
//! a snapshot only when its contents changed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::auth::FirebaseAuth;
use super::value::{decode_fields, encode_fields};
use crate::backend::{Document, DocumentStore, Fields};
use crate::error::{GatherError, GatherResult};
use crate::live::LiveQuery;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: &str = "300";

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl RawDocument {
    fn into_document(self) -> GatherResult<Document> {
        // name = projects/{p}/databases/(default)/documents/{collection}/{id}
        let id = self.name.rsplit('/').next().unwrap_or_default();
        Ok(Document::new(id, decode_fields(&self.fields)?))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Query for a field-level update that must not create the document.
fn update_query(fields: &Fields) -> Vec<(&str, &str)> {
    let mut query: Vec<(&str, &str)> = fields
        .keys()
        .map(|key| ("updateMask.fieldPaths", key.as_str()))
        .collect();
    query.push(("currentDocument.exists", "true"));
    query
}

#[derive(Clone)]
pub struct Firestore {
    http: reqwest::Client,
    documents_url: String,
    auth: Arc<FirebaseAuth>,
    poll_interval: Duration,
}

impl Firestore {
    pub fn new(
        http: reqwest::Client,
        project_id: &str,
        auth: Arc<FirebaseAuth>,
        poll_interval: Duration,
    ) -> Self {
        Firestore {
            http,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                FIRESTORE_URL, project_id
            ),
            auth,
            poll_interval,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    async fn authorized(&self, request: reqwest::RequestBuilder) -> GatherResult<reqwest::Response> {
        let token = self.auth.id_token().await?;
        Ok(request.bearer_auth(token).send().await?)
    }

    async fn check(resp: reqwest::Response) -> GatherResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let message = match resp.json::<ErrorResponse>().await {
            Ok(err) => err.error.message,
            Err(_) => status.to_string(),
        };
        Err(GatherError::Backend(format!("Firestore {status}: {message}")))
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn insert(&self, collection: &str, fields: Fields) -> GatherResult<String> {
        let body = serde_json::json!({ "fields": encode_fields(&fields) });
        let resp = self
            .authorized(self.http.post(self.collection_url(collection)).json(&body))
            .await?;
        let raw: RawDocument = Self::check(resp).await?.json().await?;
        Ok(raw.into_document()?.id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        let body = serde_json::json!({ "fields": encode_fields(&fields) });
        let resp = self
            .authorized(self.http.patch(self.document_url(collection, id)).json(&body))
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> GatherResult<Option<Document>> {
        let resp = self
            .authorized(self.http.get(self.document_url(collection, id)))
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawDocument = Self::check(resp).await?.json().await?;
        Ok(Some(raw.into_document()?))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> GatherResult<()> {
        let query = update_query(&fields);
        let body = serde_json::json!({ "fields": encode_fields(&fields) });
        let resp = self
            .authorized(
                self.http
                    .patch(self.document_url(collection, id))
                    .query(&query)
                    .json(&body),
            )
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatherError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> GatherResult<()> {
        let resp = self
            .authorized(self.http.delete(self.document_url(collection, id)))
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> GatherResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let resp = self
                .authorized(self.http.get(self.collection_url(collection)).query(&query))
                .await?;
            let page: ListResponse = Self::check(resp).await?.json().await?;

            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    fn subscribe(&self, collection: &str) -> LiveQuery {
        let store = self.clone();
        let name = collection.to_string();

        LiveQuery::polling(collection.to_string(), self.poll_interval, move || {
            let store = store.clone();
            let name = name.clone();
            async move { store.list(&name).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_id_comes_from_resource_name() {
        let raw: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/events/abc123",
            "fields": {"name": {"stringValue": "Meetup"}},
            "createTime": "2025-03-20T15:00:00Z"
        }))
        .unwrap();

        let doc = raw.into_document().unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields.get("name"), Some(&json!("Meetup")));
    }

    #[test]
    fn empty_list_response_parses() {
        let page: ListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn update_masks_every_field_and_requires_existing_document() {
        let fields = json!({"name": "Standup", "venue": null});
        let query = update_query(fields.as_object().unwrap());

        assert!(query.contains(&("updateMask.fieldPaths", "name")));
        assert!(query.contains(&("updateMask.fieldPaths", "venue")));
        assert_eq!(query.last(), Some(&("currentDocument.exists", "true")));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn urls_are_scoped_to_project() {
        let auth = Arc::new(FirebaseAuth::new(reqwest::Client::new(), "key"));
        let store = Firestore::new(reqwest::Client::new(), "proj", auth, Duration::from_secs(1));
        assert_eq!(
            store.document_url("events", "e1"),
            "https://firestore.googleapis.com/v1/projects/proj/databases/(default)/documents/events/e1"
        );
    }
}
