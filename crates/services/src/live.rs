//! # Live snapshots
//!
//! The store is the single source of truth; list views subscribe to a
//! topic and receive the *entire* current result set again after every
//! relevant change. Consumers replace their local state wholesale; there
//! is no incremental diffing to get wrong.
//!
//! Dropping the returned stream drops the underlying broadcast receiver,
//! which is the release a consumer owes us on teardown.

use std::future::Future;

use futures_util::stream::{self, Stream};
use tokio::sync::broadcast;
use uuid::Uuid;

use domains::Result;

/// Coarse change topics published by services after successful mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The public approved-ads listing changed.
    ApprovedAds,
    /// The conversation list of this user changed.
    Conversations(Uuid),
    /// The message log of this conversation grew.
    Messages(Uuid),
    /// The notification list of this user changed.
    Notifications(Uuid),
}

/// Fan-out point connecting mutating services to live list views.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<Change>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        ChangeHub { tx }
    }

    /// Best-effort: with no live subscribers the change is simply dropped.
    pub fn publish(&self, change: Change) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        // Topics are tiny; a lagging subscriber just refetches.
        ChangeHub::new(256)
    }
}

struct SnapshotState<M, F> {
    rx: broadcast::Receiver<Change>,
    matches: M,
    fetch: F,
    initial: bool,
}

/// A live query: yields the current snapshot immediately, then a fresh
/// full snapshot after every change accepted by `matches`. Ends when the
/// hub is dropped.
pub fn snapshots<T, M, F, Fut>(
    hub: &ChangeHub,
    matches: M,
    fetch: F,
) -> impl Stream<Item = Vec<T>> + Send
where
    T: Send + 'static,
    M: Fn(&Change) -> bool + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    let state = SnapshotState {
        rx: hub.subscribe(),
        matches,
        fetch,
        initial: true,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if state.initial {
                state.initial = false;
            } else {
                loop {
                    match state.rx.recv().await {
                        Ok(change) if (state.matches)(&change) => break,
                        Ok(_) => continue,
                        // Missed events are harmless: the next snapshot is
                        // authoritative regardless of how many we skipped.
                        Err(broadcast::error::RecvError::Lagged(_)) => break,
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
            match (state.fetch)().await {
                Ok(snapshot) => return Some((snapshot, state)),
                Err(err) => {
                    tracing::warn!(error = %err, "live snapshot refresh failed, waiting for next change");
                    continue;
                }
            }
        }
    })
}
