//! Event and favorite operations.
//!
//! Mutations are fire-and-forget from the caller's point of view: a backend
//! failure is logged and swallowed, and the next snapshot from the live
//! subscriptions shows whatever actually happened.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::backend::{Backend, Document, Fields, to_fields};
use crate::error::{GatherError, GatherResult};
use crate::live::Subscription;
use crate::model::{EVENTS, Event, FAVORITES, Favorite, Identity};

#[derive(Clone)]
pub struct DataAccess {
    backend: Backend,
}

/// Decode every document, skipping (and logging) the ones that don't fit.
fn decode_all<T>(docs: &[Document], decode: fn(&Document) -> GatherResult<T>) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match decode(doc) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(id = %doc.id, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

fn as_fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

impl DataAccess {
    pub fn new(backend: Backend) -> Self {
        DataAccess { backend }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.backend.auth.current_user()
    }

    fn require_user(&self) -> GatherResult<Identity> {
        self.current_user().ok_or(GatherError::NotSignedIn)
    }

    /// Live list of every event.
    pub fn subscribe_events(&self) -> Subscription<Vec<Event>> {
        let query = self.backend.store.subscribe(EVENTS);
        Subscription::new("events", query, |docs| decode_all(docs, Event::from_document))
    }

    /// Live list of event ids the current user has favorited.
    ///
    /// The user is captured when the subscription opens. Duplicate favorite
    /// records show up as repeated ids.
    pub fn subscribe_favorites(&self) -> GatherResult<Subscription<Vec<String>>> {
        let user = self.require_user()?;
        let query = self.backend.store.subscribe(FAVORITES);
        Ok(Subscription::new("favorites", query, move |docs| {
            decode_all(docs, Favorite::from_document)
                .into_iter()
                .filter(|fav| fav.user_id == user.uid)
                .map(|fav| fav.event_id)
                .collect()
        }))
    }

    /// Insert a new event attributed to the current user.
    ///
    /// Returns the new id, or `None` if the write failed (the failure is logged).
    pub async fn create_event(
        &self,
        name: &str,
        date_time: Option<DateTime<Utc>>,
        venue: Option<&str>,
    ) -> Option<String> {
        match self.try_create_event(name, date_time, venue).await {
            Ok(id) => {
                tracing::debug!(%id, "event created");
                Some(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error adding event");
                None
            }
        }
    }

    async fn try_create_event(
        &self,
        name: &str,
        date_time: Option<DateTime<Utc>>,
        venue: Option<&str>,
    ) -> GatherResult<String> {
        let user = self.require_user()?;
        let event = Event {
            id: String::new(),
            name: name.to_string(),
            venue: venue.map(str::to_string),
            date_time,
            created_by: user.uid,
        };
        self.backend.store.insert(EVENTS, to_fields(&event)?).await
    }

    /// Overwrite name, date and venue of an event.
    pub async fn update_event(
        &self,
        id: &str,
        name: &str,
        date_time: Option<DateTime<Utc>>,
        venue: Option<&str>,
    ) {
        let fields = as_fields(json!({
            "name": name,
            "date": date_time,
            "venue": venue,
        }));

        match self.backend.store.update(EVENTS, id, fields).await {
            Ok(()) => tracing::debug!(%id, "event updated"),
            Err(e) => tracing::error!(%id, error = %e, "Error updating event"),
        }
    }

    pub async fn delete_event(&self, id: &str) {
        match self.backend.store.delete(EVENTS, id).await {
            Ok(()) => tracing::debug!(%id, "event deleted"),
            Err(e) => tracing::error!(%id, error = %e, "Error deleting event"),
        }
    }

    /// Mark or unmark an event as a favorite of the current user.
    ///
    /// `true` inserts a record without looking for an existing one, so calling
    /// it twice leaves two records. `false` deletes every matching record one by
    /// one; a failure part-way leaves the rest in place.
    pub async fn set_favorite(&self, event_id: &str, desired: bool) {
        let result = if desired {
            self.add_favorite(event_id).await
        } else {
            self.remove_favorites(event_id).await
        };

        if let Err(e) = result {
            let action = if desired { "adding to" } else { "removing from" };
            tracing::error!(%event_id, error = %e, "Error {action} favorites");
        }
    }

    async fn add_favorite(&self, event_id: &str) -> GatherResult<()> {
        let user = self.require_user()?;
        let id = self
            .backend
            .store
            .insert(FAVORITES, to_fields(&Favorite::new(event_id, &user.uid))?)
            .await?;
        tracing::debug!(%event_id, favorite = %id, "favorite added");
        Ok(())
    }

    async fn remove_favorites(&self, event_id: &str) -> GatherResult<()> {
        let user = self.require_user()?;
        let docs = self.backend.store.list(FAVORITES).await?;

        let matching: Vec<Favorite> = decode_all(&docs, Favorite::from_document)
            .into_iter()
            .filter(|fav| fav.matches(event_id, &user.uid))
            .collect();

        let mut removed = 0;
        for fav in &matching {
            match self.backend.store.delete(FAVORITES, &fav.id).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::error!(favorite = %fav.id, error = %e, "Error removing from favorites")
                }
            }
        }

        tracing::debug!(%event_id, removed, matched = matching.len(), "favorites removed");
        Ok(())
    }
}
