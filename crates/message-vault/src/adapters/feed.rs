//! # Message Feed
//!
//! Rebuilds message history from committed `MessageStored` events, the way
//! an off-chain indexer would. Only the counter lives in vault state, so
//! this is the only place message content and actors come back together.

use crate::domain::entities::MessageRecord;
use crate::domain::value_objects::Address;
use crate::events::{topics, VaultEvent};
use crate::service::VaultService;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// The receiver fell behind and the channel dropped events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("feed lagged: {skipped} events dropped, {added} messages added")]
pub struct FeedLagged {
    /// Events the channel dropped before they were read.
    pub skipped: u64,
    /// Messages recorded from the events that were still buffered.
    pub added: usize,
}

/// Messages of one vault, ordered by id.
#[derive(Debug, Clone)]
pub struct MessageFeed {
    vault: Address,
    records: BTreeMap<u64, MessageRecord>,
}

impl MessageFeed {
    /// Empty feed for the vault at `vault`.
    #[must_use]
    pub fn new(vault: Address) -> Self {
        Self {
            vault,
            records: BTreeMap::new(),
        }
    }

    /// Feed built from an event log.
    #[must_use]
    pub fn from_events<'a>(vault: Address, events: impl IntoIterator<Item = &'a VaultEvent>) -> Self {
        let mut feed = Self::new(vault);
        for event in events {
            feed.ingest(event);
        }
        feed
    }

    /// Folds one event in. Events of other vaults and other kinds are ignored.
    ///
    /// Returns true if a new message was recorded.
    pub fn ingest(&mut self, event: &VaultEvent) -> bool {
        if event.topic() != topics::MESSAGE_STORED {
            return false;
        }
        let VaultEvent::MessageStored {
            vault,
            actor,
            id,
            content,
        } = event
        else {
            return false;
        };
        if *vault != self.vault || self.records.contains_key(id) {
            return false;
        }
        self.records.insert(
            *id,
            MessageRecord {
                id: *id,
                actor: *actor,
                content: content.clone(),
            },
        );
        true
    }

    /// Drains whatever `receiver` has buffered.
    ///
    /// Returns how many messages were added, or [`FeedLagged`] when the
    /// channel dropped events along the way. Everything still buffered is
    /// ingested either way; recover the gap with [`Self::resync`].
    pub fn catch_up(&mut self, receiver: &mut broadcast::Receiver<VaultEvent>) -> Result<usize, FeedLagged> {
        let mut added = 0;
        let mut skipped = 0;
        loop {
            match receiver.try_recv() {
                Ok(event) => added += usize::from(self.ingest(&event)),
                Err(broadcast::error::TryRecvError::Lagged(n)) => skipped += n,
                Err(_) => break,
            }
        }
        if skipped > 0 {
            return Err(FeedLagged { skipped, added });
        }
        Ok(added)
    }

    /// Folds in a full event log, filling any ids missed so far.
    ///
    /// Returns how many messages were added.
    pub fn resync<'a>(&mut self, events: impl IntoIterator<Item = &'a VaultEvent>) -> usize {
        events
            .into_iter()
            .map(|event| usize::from(self.ingest(event)))
            .sum()
    }

    /// Catches up from `receiver`, falling back to the committed log of
    /// `service` when the channel lagged.
    pub fn follow(&mut self, receiver: &mut broadcast::Receiver<VaultEvent>, service: &VaultService) -> usize {
        match self.catch_up(receiver) {
            Ok(added) => added,
            Err(lagged) => {
                warn!(skipped = lagged.skipped, "message feed lagged, resyncing from the event log");
                lagged.added + self.resync(&service.events())
            }
        }
    }

    /// All messages in id order.
    pub fn records(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.values()
    }

    /// The `n` newest messages, newest first.
    #[must_use]
    pub fn latest(&self, n: usize) -> Vec<&MessageRecord> {
        self.records.values().rev().take(n).collect()
    }

    /// Number of messages seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no message was seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
