//! Document types stored in the backend.
//!
//! Field names follow the stored document schema (`createdBy`, `eventId`, ...),
//! so the same documents can be read by other clients of the same project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::Document;
use crate::error::GatherResult;

pub const EVENTS: &str = "events";
pub const FAVORITES: &str = "favorites";
pub const USERS: &str = "users";

/// An authenticated identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Profile document written at sign-up, keyed by the identity's uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A signed-in user: identity plus the display name from the profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    pub fn new(identity: Identity, profile: &Profile) -> Self {
        User {
            id: identity.uid,
            email: identity.email,
            name: profile.name.clone(),
        }
    }
}

/// An event in the `events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub venue: Option<String>,
    /// Stored as `date` (RFC 3339).
    #[serde(default, rename = "date")]
    pub date_time: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl Event {
    pub fn from_document(doc: &Document) -> GatherResult<Self> {
        let mut event: Event = doc.decode()?;
        event.id = doc.id.clone();
        Ok(event)
    }

    /// Only the creator gets edit and delete controls.
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.created_by == uid
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A (user, event) favorite record in the `favorites` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(skip)]
    pub id: String,
    pub event_id: String,
    pub user_id: String,
}

impl Favorite {
    pub fn new(event_id: &str, user_id: &str) -> Self {
        Favorite {
            id: String::new(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    pub fn from_document(doc: &Document) -> GatherResult<Self> {
        let mut favorite: Favorite = doc.decode()?;
        favorite.id = doc.id.clone();
        Ok(favorite)
    }

    pub fn matches(&self, event_id: &str, user_id: &str) -> bool {
        self.event_id == event_id && self.user_id == user_id
    }
}
