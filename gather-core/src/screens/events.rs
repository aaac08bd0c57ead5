use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{Alert, FIRST_SNAPSHOT_WAIT};
use crate::auth;
use crate::data::DataAccess;
use crate::error::{GatherError, GatherResult};
use crate::live::Subscription;
use crate::model::{Event, Identity};

/// One entry in the event list.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event: Event,
    /// Edit and delete controls are only offered to the creator.
    pub can_edit: bool,
    pub is_favorite: bool,
}

impl EventRow {
    pub fn favorite_label(&self) -> &'static str {
        if self.is_favorite {
            "Added to Favorites"
        } else {
            "Add to Favorites"
        }
    }
}

/// The "new event" form at the top of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub name: String,
    pub venue: String,
    pub date_time: DateTime<Utc>,
}

impl EventForm {
    pub fn new() -> Self {
        EventForm {
            name: String::new(),
            venue: String::new(),
            date_time: Utc::now(),
        }
    }
}

impl Default for EventForm {
    fn default() -> Self {
        Self::new()
    }
}

/// The edit dialog for an existing event.
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub event_id: String,
    pub name: String,
    pub venue: String,
    pub date_time: DateTime<Utc>,
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Every event, with favorite state for the signed-in user.
pub struct EventScreen {
    data: DataAccess,
    user: Identity,
    events: Subscription<Vec<Event>>,
    favorites: Subscription<Vec<String>>,
    pub form: EventForm,
    pub editing: Option<EditForm>,
}

impl EventScreen {
    /// Open the screen and its two subscriptions. They are released when the
    /// screen is dropped.
    ///
    /// Waits for the first snapshot of each so rows and favorite state reflect
    /// the store, not an empty placeholder.
    pub async fn open(data: DataAccess) -> GatherResult<Self> {
        let user = data.current_user().ok_or(GatherError::NotSignedIn)?;
        let mut events = data.subscribe_events();
        let mut favorites = data.subscribe_favorites()?;

        let ready = events.ready(FIRST_SNAPSHOT_WAIT).await;
        if !(ready && favorites.ready(FIRST_SNAPSHOT_WAIT).await) {
            tracing::warn!("event screen opened before the first snapshot arrived");
        }

        Ok(EventScreen {
            data,
            user,
            events,
            favorites,
            form: EventForm::new(),
            editing: None,
        })
    }

    pub fn user(&self) -> &Identity {
        &self.user
    }

    pub fn rows(&self) -> Vec<EventRow> {
        let favorites = self.favorites.current();
        self.events
            .current()
            .into_iter()
            .map(|event| EventRow {
                can_edit: event.is_owned_by(&self.user.uid),
                is_favorite: favorites.contains(&event.id),
                event,
            })
            .collect()
    }

    fn owned_event(&self, event_id: &str) -> Option<Event> {
        self.events
            .current()
            .into_iter()
            .find(|e| e.id == event_id && e.is_owned_by(&self.user.uid))
    }

    /// Wait until either subscription delivers a new snapshot.
    ///
    /// Returns `false` once the backend has closed the subscriptions.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            events = self.events.next() => events.is_some(),
            favorites = self.favorites.next() => favorites.is_some(),
        }
    }

    /// Wait up to `wait` for the next snapshot, e.g. after a mutation on a
    /// store that publishes on its own schedule.
    pub async fn refresh(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.changed())
            .await
            .unwrap_or(false)
    }

    /// Submit the new-event form. Name and venue must not be blank.
    ///
    /// Returns whether the form was submitted; a backend failure is only logged.
    pub async fn add_event(&mut self) -> bool {
        let (Some(name), Some(venue)) = (non_blank(&self.form.name), non_blank(&self.form.venue))
        else {
            return false;
        };

        self.data
            .create_event(name, Some(self.form.date_time), Some(venue))
            .await;
        self.form = EventForm::new();
        true
    }

    /// Open the edit form for an event the user created.
    pub fn begin_edit(&mut self, event_id: &str) -> bool {
        let Some(event) = self.owned_event(event_id) else {
            return false;
        };

        self.editing = Some(EditForm {
            event_id: event.id,
            name: event.name,
            venue: event.venue.unwrap_or_default(),
            date_time: event.date_time.unwrap_or_else(Utc::now),
        });
        true
    }

    /// Save the edit form. A blank name keeps the form open.
    pub async fn save_edit(&mut self) -> bool {
        let Some(edit) = &self.editing else {
            return false;
        };
        if edit.name.trim().is_empty() {
            return false;
        }

        self.data
            .update_event(
                &edit.event_id,
                &edit.name,
                Some(edit.date_time),
                non_blank(&edit.venue),
            )
            .await;
        self.editing = None;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Delete an event the user created. Other users' events are left alone.
    pub async fn delete_event(&mut self, event_id: &str) -> bool {
        if self.owned_event(event_id).is_none() {
            return false;
        }
        self.data.delete_event(event_id).await;
        true
    }

    /// Flip the favorite state based on what the subscription currently shows.
    pub async fn toggle_favorite(&mut self, event_id: &str) {
        let is_favorite = self.favorites.current().iter().any(|id| id == event_id);
        self.data.set_favorite(event_id, !is_favorite).await;
    }

    /// Sign out of the provider. On success the caller drops the screen.
    pub async fn log_out(&self) -> Result<(), Alert> {
        auth::log_out(self.data.backend()).await.map_err(|e| {
            tracing::error!(error = %e, "Error logging out");
            Alert::new("Error", "Failed to log out")
        })
    }
}
