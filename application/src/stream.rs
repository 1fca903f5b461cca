//! Push-path session feed
//!
//! Wraps a [`TranscriptSubscription`] into the stream the push client
//! consumes: a replay of everything already logged, the live tail, and
//! heartbeat frames whenever the session idles (e.g. while a slow external
//! generation call is in flight). Entries are deduplicated by offset, so a
//! reconnecting client can always resubscribe from scratch idempotently.

use crate::ports::transcript_log::TranscriptSubscription;
use council_domain::SequencedEntry;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::warn;

/// One frame on the push path.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Entry(SequencedEntry),
    /// No-op keepalive; absence of these for a bounded interval is the
    /// client's signal to reconnect.
    Heartbeat,
}

/// Pull-based view of one session's push feed.
#[derive(Debug)]
pub struct SessionFeed {
    pending: VecDeque<SequencedEntry>,
    live: broadcast::Receiver<SequencedEntry>,
    next_offset: u64,
    heartbeat: Duration,
    finished: bool,
}

impl SessionFeed {
    pub fn new(subscription: TranscriptSubscription, heartbeat: Duration) -> Self {
        Self {
            pending: subscription.snapshot.into(),
            live: subscription.live,
            next_offset: 0,
            heartbeat,
            finished: false,
        }
    }

    /// Next frame: a replayed or live entry, or a heartbeat after an idle
    /// interval. Returns `None` once the completion marker has been
    /// delivered (or the session's log was dropped).
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        if self.finished {
            return None;
        }

        if let Some(entry) = self.pending.pop_front() {
            return Some(self.emit(entry));
        }

        loop {
            tokio::select! {
                result = self.live.recv() => match result {
                    Ok(entry) => {
                        // Already delivered via the snapshot replay
                        if entry.offset < self.next_offset {
                            continue;
                        }
                        return Some(self.emit(entry));
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // The durable log still has the entries; a client
                        // that cares reconnects and replays.
                        warn!(missed, "push feed lagged behind the log");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        self.finished = true;
                        return None;
                    }
                },
                _ = tokio::time::sleep(self.heartbeat) => {
                    return Some(FeedEvent::Heartbeat);
                }
            }
        }
    }

    fn emit(&mut self, entry: SequencedEntry) -> FeedEvent {
        self.next_offset = entry.offset + 1;
        if entry.entry.is_terminal() {
            self.finished = true;
        }
        FeedEvent::Entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::LogEntry;

    fn entry(offset: u64) -> SequencedEntry {
        SequencedEntry::new(offset, LogEntry::notice(format!("n{}", offset)))
    }

    fn feed_with(
        snapshot: Vec<SequencedEntry>,
        capacity: usize,
    ) -> (broadcast::Sender<SequencedEntry>, SessionFeed) {
        let (tx, live) = broadcast::channel(capacity);
        let feed = SessionFeed::new(
            TranscriptSubscription { snapshot, live },
            Duration::from_millis(20),
        );
        (tx, feed)
    }

    #[tokio::test]
    async fn snapshot_is_replayed_before_live_entries() {
        let (tx, mut feed) = feed_with(vec![entry(0), entry(1)], 16);
        tx.send(entry(2)).unwrap();

        for expected in 0..3u64 {
            match feed.next_event().await.unwrap() {
                FeedEvent::Entry(e) => assert_eq!(e.offset, expected),
                FeedEvent::Heartbeat => panic!("unexpected heartbeat"),
            }
        }
    }

    #[tokio::test]
    async fn live_duplicates_of_replayed_offsets_are_skipped() {
        let (tx, mut feed) = feed_with(vec![entry(0)], 16);
        // The log broadcast both entries around the subscription instant
        tx.send(entry(0)).unwrap();
        tx.send(entry(1)).unwrap();

        let first = feed.next_event().await.unwrap();
        let second = feed.next_event().await.unwrap();
        assert_eq!(first, FeedEvent::Entry(entry(0)));
        assert_eq!(second, FeedEvent::Entry(entry(1)));
    }

    #[tokio::test]
    async fn heartbeat_fires_while_idle() {
        let (_tx, mut feed) = feed_with(vec![], 16);
        assert_eq!(feed.next_event().await, Some(FeedEvent::Heartbeat));
        assert_eq!(feed.next_event().await, Some(FeedEvent::Heartbeat));
    }

    #[tokio::test]
    async fn completion_marker_ends_the_feed() {
        let (tx, mut feed) = feed_with(vec![], 16);
        tx.send(SequencedEntry::new(0, LogEntry::Completed)).unwrap();

        match feed.next_event().await.unwrap() {
            FeedEvent::Entry(e) => assert!(e.entry.is_terminal()),
            FeedEvent::Heartbeat => panic!("unexpected heartbeat"),
        }
        assert_eq!(feed.next_event().await, None);
    }

    #[tokio::test]
    async fn dropped_log_closes_the_feed() {
        let (tx, mut feed) = feed_with(vec![], 16);
        drop(tx);
        assert_eq!(feed.next_event().await, None);
    }
}
