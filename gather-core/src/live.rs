//! Live queries.
//!
//! A [`LiveQuery`] is the raw stream of collection snapshots from a store. A
//! [`Subscription`] projects each snapshot into what a screen needs (events,
//! favorite ids, ...). Both are scoped resources: dropping them releases the
//! listener, and for polling stores also stops the background task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::Document;
use crate::error::GatherResult;

/// Full contents of a collection at one point in time.
pub type Snapshot = Arc<Vec<Document>>;

/// Stream of snapshots for one collection.
pub struct LiveQuery {
    rx: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl LiveQuery {
    pub fn new(rx: watch::Receiver<Snapshot>) -> Self {
        LiveQuery { rx, task: None }
    }

    /// A live query fed by a background task that is aborted on drop.
    pub fn with_task(rx: watch::Receiver<Snapshot>, task: JoinHandle<()>) -> Self {
        LiveQuery {
            rx,
            task: Some(task),
        }
    }

    /// Latest snapshot without waiting.
    pub fn snapshot(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot. Returns `None` once the store side has gone away.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Sending half for stores that poll: publishes a fetched collection only when
/// it differs from the previous fetch.
pub struct PollPublisher {
    tx: watch::Sender<Snapshot>,
    last: Option<Vec<Document>>,
}

impl PollPublisher {
    /// The receiver starts empty and sees its first change on the first publish,
    /// even if that fetch is an empty collection.
    pub fn channel() -> (Self, watch::Receiver<Snapshot>) {
        let (tx, rx) = watch::channel(Arc::new(Vec::new()));
        (PollPublisher { tx, last: None }, rx)
    }

    /// Returns whether `docs` was sent.
    pub fn publish(&mut self, docs: Vec<Document>) -> bool {
        if self.last.as_ref() == Some(&docs) {
            return false;
        }
        self.last = Some(docs.clone());
        self.tx.send_replace(Arc::new(docs));
        true
    }

    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

impl LiveQuery {
    /// A live query that calls `fetch` every `interval` until it is dropped.
    ///
    /// Failed fetches are logged and the previous snapshot stays current.
    pub fn polling<F, Fut>(label: String, interval: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = GatherResult<Vec<Document>>> + Send,
    {
        let (mut publisher, rx) = PollPublisher::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = publisher.closed() => break,
                    _ = ticker.tick() => {}
                }

                match fetch().await {
                    Ok(docs) => {
                        if publisher.publish(docs) {
                            tracing::trace!(query = %label, "snapshot changed");
                        }
                    }
                    Err(e) => tracing::error!(query = %label, error = %e, "live query poll failed"),
                }
            }

            tracing::debug!(query = %label, "live query stopped");
        });

        LiveQuery::with_task(rx, task)
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

type Projection<T> = Box<dyn Fn(&[Document]) -> T + Send + Sync>;

/// A live query with a projection applied to every snapshot.
pub struct Subscription<T> {
    name: &'static str,
    query: LiveQuery,
    project: Projection<T>,
}

impl<T> Subscription<T> {
    pub fn new<F>(name: &'static str, query: LiveQuery, project: F) -> Self
    where
        F: Fn(&[Document]) -> T + Send + Sync + 'static,
    {
        tracing::debug!(subscription = name, "subscribed");
        Subscription {
            name,
            query,
            project: Box::new(project),
        }
    }

    /// Projection of the latest snapshot.
    pub fn current(&self) -> T {
        (self.project)(&self.query.snapshot())
    }

    /// Wait up to `timeout` for the store's first snapshot.
    ///
    /// Stores that fill their queries in the background start out empty, so a
    /// screen reading [`current`](Self::current) before this would see nothing.
    /// Returns `false` on timeout; the subscription keeps working either way.
    pub async fn ready(&mut self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.query.changed()).await,
            Ok(Some(_))
        )
    }

    /// Wait for the next change and return its projection.
    pub async fn next(&mut self) -> Option<T> {
        let snapshot = self.query.changed().await?;
        Some((self.project)(&snapshot))
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        tracing::debug!(subscription = self.name, "released");
    }
}
