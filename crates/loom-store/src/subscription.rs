//! Push delivery of story snapshots.
//!
//! Each subscriber owns a broadcast channel keyed by story. Publishing a
//! snapshot fans it out to every subscriber of that story; subscribers whose
//! receivers were dropped are pruned on the next publish.

use std::sync::RwLock;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

use loom_types::StoryId;

/// A live feed of full snapshots for one story.
///
/// Dropping the subscription (or calling [`unsubscribe`]) ends it.
///
/// [`unsubscribe`]: Subscription::unsubscribe
#[derive(Debug)]
pub struct Subscription<T> {
    story: StoryId,
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// The story this subscription follows.
    pub fn story(&self) -> &StoryId {
        &self.story
    }

    /// Wait for the next snapshot. Returns `None` once the store is gone.
    ///
    /// If this subscriber fell behind, the snapshots it missed are skipped;
    /// each snapshot is complete, so only the newest ones matter.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(story = %self.story, skipped, "subscriber lagged; skipping stale snapshots");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next pending snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(story = %self.story, skipped, "subscriber lagged; skipping stale snapshots");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain everything pending and return only the newest snapshot.
    pub fn latest(&mut self) -> Option<T> {
        let mut newest = None;
        while let Some(snapshot) = self.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    /// Stop receiving snapshots.
    pub fn unsubscribe(self) {}
}

/// Internal subscriber: a story key paired with a broadcast sender.
struct Subscriber<T> {
    story: StoryId,
    sender: broadcast::Sender<T>,
}

/// Fan-out router that delivers snapshots to a story's subscribers.
pub(crate) struct SnapshotRouter<T> {
    subscribers: RwLock<Vec<Subscriber<T>>>,
    capacity: usize,
}

impl<T: Clone> SnapshotRouter<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a subscriber and hand it `initial` straight away.
    pub(crate) fn subscribe(&self, story: StoryId, initial: T) -> Subscription<T> {
        let (sender, receiver) = broadcast::channel(self.capacity);
        // The receiver is alive, so this cannot fail.
        let _ = sender.send(initial);
        self.subscribers
            .write()
            .expect("router lock poisoned")
            .push(Subscriber {
                story: story.clone(),
                sender,
            });
        Subscription { story, receiver }
    }

    /// Deliver a snapshot to every live subscriber of `story`.
    pub(crate) fn publish(&self, story: &StoryId, snapshot: &T) {
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        subs.retain(|sub| {
            if &sub.story == story {
                sub.sender.send(snapshot.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
    }

    /// Returns `true` if anyone follows `story`.
    pub(crate) fn has_subscribers(&self, story: &StoryId) -> bool {
        self.subscribers
            .read()
            .expect("router lock poisoned")
            .iter()
            .any(|sub| &sub.story == story && sub.sender.receiver_count() > 0)
    }

    /// Number of registered subscribers, including ones not yet pruned.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("router lock poisoned").len()
    }
}
