//! Screen state.
//!
//! Each screen owns the live subscriptions it needs for as long as it exists,
//! derives its rows from them, and turns user actions into data-access calls.
//! Rendering is left to the front-end.

use std::time::Duration;

mod events;
mod favorites;
mod login;
mod sign_up;

pub use events::{EditForm, EventForm, EventRow, EventScreen};
pub use favorites::FavoritesScreen;
pub use login::LoginScreen;
pub use sign_up::SignUpScreen;

/// How long `open` waits for each subscription's first snapshot.
pub const FIRST_SNAPSHOT_WAIT: Duration = Duration::from_secs(10);

/// A titled message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: &str, message: &str) -> Self {
        Alert {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
