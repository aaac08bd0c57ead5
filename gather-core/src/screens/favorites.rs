use std::time::Duration;

use super::FIRST_SNAPSHOT_WAIT;
use crate::data::DataAccess;
use crate::error::GatherResult;
use crate::live::Subscription;
use crate::model::Event;

/// Events the signed-in user has favorited.
pub struct FavoritesScreen {
    data: DataAccess,
    favorites: Subscription<Vec<String>>,
    events: Subscription<Vec<Event>>,
}

impl FavoritesScreen {
    pub const TITLE: &'static str = "Your Favorites";
    pub const REMOVE_LABEL: &'static str = "Remove from Favorites";

    /// Open both subscriptions and wait for their first snapshots.
    pub async fn open(data: DataAccess) -> GatherResult<Self> {
        let mut favorites = data.subscribe_favorites()?;
        let mut events = data.subscribe_events();

        let ready = favorites.ready(FIRST_SNAPSHOT_WAIT).await;
        if !(ready && events.ready(FIRST_SNAPSHOT_WAIT).await) {
            tracing::warn!("favorites screen opened before the first snapshot arrived");
        }
        Ok(FavoritesScreen {
            data,
            favorites,
            events,
        })
    }

    /// Favorited events in event-list order. Duplicate favorite records don't
    /// duplicate rows.
    pub fn rows(&self) -> Vec<Event> {
        let ids = self.favorites.current();
        self.events
            .current()
            .into_iter()
            .filter(|event| ids.contains(&event.id))
            .collect()
    }

    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            favorites = self.favorites.next() => favorites.is_some(),
            events = self.events.next() => events.is_some(),
        }
    }

    pub async fn refresh(&mut self, wait: Duration) -> bool {
        tokio::time::timeout(wait, self.changed())
            .await
            .unwrap_or(false)
    }

    /// Un-favorite: removes every favorite record for this event and user.
    pub async fn remove(&mut self, event_id: &str) {
        self.data.set_favorite(event_id, false).await;
    }
}
