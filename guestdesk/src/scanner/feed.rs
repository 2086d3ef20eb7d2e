//! Camera decode feed.
//!
//! The camera reports batches of detected codes. Only the first payload of
//! a batch is considered, and a batch whose first payload is blank is
//! ignored. The feed holds at most one pending payload: a batch that arrives
//! while a decode is waiting or a result is on screen is dropped.

use super::reducer::{ScannerAction, TokenSource};
use super::terminals::ScannerStore;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What happened to a decode batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOutcome {
    /// The payload was queued for the terminal
    Queued,
    /// The batch had no usable payload
    Empty,
    /// The terminal was busy; the batch was discarded
    Dropped,
}

/// Sending half of a terminal's decode feed.
#[derive(Debug, Clone)]
pub struct DecodeFeed {
    sender: mpsc::Sender<String>,
}

impl DecodeFeed {
    /// Start the feed worker for `store`.
    ///
    /// The worker exits when every [`DecodeFeed`] clone is dropped or the
    /// store shuts down.
    #[must_use]
    pub fn spawn(store: ScannerStore) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(1);
        let worker = tokio::spawn(run(store, receiver));
        (Self { sender }, worker)
    }

    /// Offer a batch of decoded payloads.
    pub fn offer<I, S>(&self, batch: I) -> FeedOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(first) = batch.into_iter().next() else {
            return FeedOutcome::Empty;
        };
        let payload = first.as_ref().trim();
        if payload.is_empty() {
            return FeedOutcome::Empty;
        }
        let payload = payload.to_string();

        match self.sender.try_send(payload) {
            Ok(()) => FeedOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => FeedOutcome::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Decode feed closed");
                FeedOutcome::Dropped
            },
        }
    }
}

async fn run(store: ScannerStore, mut receiver: mpsc::Receiver<String>) {
    while let Some(token) = receiver.recv().await {
        if !store.state(|s| s.phase.is_accepting_input()).await {
            tracing::debug!("Decode dropped: result on screen");
            continue;
        }

        let sent = store
            .send(ScannerAction::TokenSubmitted {
                token,
                source: TokenSource::Camera,
            })
            .await;

        match sent {
            Ok(mut handle) => handle.wait().await,
            Err(error) => {
                tracing::warn!(%error, "Decode feed stopping");
                break;
            },
        }
    }
}
