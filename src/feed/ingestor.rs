//! Award ingestion: payload parsing, bounded buffering, and fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::{RwLock, broadcast};

use super::connection::{FeedConnection, spawn_connection};
use crate::domain::{AWARD_FEED_CAPACITY, Award, AwardBuffer, FeedEntry};
use crate::error::FeedError;

/// Entries a subscriber may fall behind by before it starts missing the
/// oldest ones.
pub const SUBSCRIBER_BACKLOG: usize = 1_024;

/// Live award feed: owns the newest-first award buffer.
///
/// Cloning yields another handle to the same buffer. Payloads are applied
/// strictly in the order [`AwardFeed::on_message`] is called; the
/// connection task calls it once per frame in arrival order.
#[derive(Debug, Clone)]
pub struct AwardFeed {
    buffer: Arc<RwLock<AwardBuffer>>,
    accepted: broadcast::Sender<FeedEntry>,
    discarded: Arc<AtomicU64>,
}

impl AwardFeed {
    /// Creates an empty feed holding [`AWARD_FEED_CAPACITY`] awards.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(AWARD_FEED_CAPACITY)
    }

    /// Creates an empty feed with a custom buffer bound.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(AwardBuffer::with_capacity(capacity))),
            accepted: broadcast::channel(SUBSCRIBER_BACKLOG).0,
            discarded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Opens one push connection to `endpoint` feeding this buffer.
    ///
    /// Returns immediately in [`super::ConnectionPhase::Connecting`]; the
    /// handshake runs on a spawned task. Must be called within a Tokio
    /// runtime.
    #[must_use]
    pub fn connect(&self, endpoint: impl Into<String>) -> FeedConnection {
        spawn_connection(endpoint.into(), self.clone())
    }

    /// Applies one text payload.
    ///
    /// A valid award is stored as the newest entry (evicting the oldest
    /// past capacity) and published to subscribers. Anything else is
    /// discarded without touching the buffer. Returns whether the payload
    /// was accepted.
    pub async fn on_message(&self, payload: &str) -> bool {
        match Award::parse(payload) {
            Ok(award) => {
                self.accept(award).await;
                true
            }
            Err(err) => {
                self.discard(&err);
                false
            }
        }
    }

    /// Records a payload that could not be used.
    pub(crate) fn discard(&self, err: &FeedError) {
        let total = self.discarded.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(error = %err, discarded = total, "discarding feed payload");
    }

    async fn accept(&self, award: Award) {
        let entry = FeedEntry::new(award, Utc::now());
        {
            let mut buffer = self.buffer.write().await;
            if let Some(evicted) = buffer.push_front(entry.clone()) {
                tracing::trace!(award_id = %evicted.award.award_id, "evicted oldest award");
            }
        }
        tracing::debug!(
            award_id = %entry.award.award_id,
            offer_id = %entry.award.offer_id,
            "award received"
        );
        if self.accepted.send(entry).is_err() {
            tracing::trace!("no live feed subscribers");
        }
    }

    /// Loads historical awards (newest first) behind the live entries.
    ///
    /// Fills only the remaining room and never reorders entries already
    /// buffered. Backfilled awards are not published to subscribers.
    /// Returns how many were stored.
    pub async fn backfill(&self, awards: Vec<Award>) -> usize {
        let now = Utc::now();
        let older = awards.into_iter().map(|award| {
            let received_at = award.created_at.unwrap_or(now);
            FeedEntry::new(award, received_at)
        });
        let stored = self.buffer.write().await.extend_back(older);
        tracing::info!(count = stored, "award feed backfilled");
        stored
    }

    /// Entries from newest to oldest.
    pub async fn snapshot(&self) -> Vec<FeedEntry> {
        self.buffer.read().await.iter().cloned().collect()
    }

    /// Number of buffered awards.
    pub async fn len(&self) -> usize {
        self.buffer.read().await.len()
    }

    /// Returns `true` if no awards are buffered.
    pub async fn is_empty(&self) -> bool {
        self.buffer.read().await.is_empty()
    }

    /// Number of payloads discarded as malformed since creation.
    #[must_use]
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Receiver for every award accepted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEntry> {
        self.accepted.subscribe()
    }
}

/// Takes every entry already queued on `receiver` without waiting, oldest
/// first.
///
/// Entries a lagging receiver has lost are skipped. Used to flush awards
/// that arrived just before the connection closed.
pub fn drain_pending(receiver: &mut broadcast::Receiver<FeedEntry>) -> Vec<FeedEntry> {
    let mut pending = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => pending.push(entry),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "live feed subscriber lagged");
            }
            Err(_) => return pending,
        }
    }
}

impl Default for AwardFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::domain::{AwardId, OfferId};

    fn payload(id: &str) -> String {
        format!(
            r#"{{"awardId":"{id}","eventId":"ev-{id}","userId":"u-1","offerId":2,"stake":12.5,"bonusAmount":1.25,"ts":1700000000000}}"#
        )
    }

    fn ids(entries: &[FeedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.award.award_id.as_str()).collect()
    }

    #[tokio::test]
    async fn valid_payloads_are_prepended() {
        let feed = AwardFeed::new();
        assert!(feed.on_message(&payload("A1")).await);
        assert!(feed.on_message(&payload("A2")).await);

        let snapshot = feed.snapshot().await;
        assert_eq!(ids(&snapshot), vec!["A2", "A1"]);
    }

    #[tokio::test]
    async fn malformed_payload_leaves_buffer_unchanged() {
        let feed = AwardFeed::new();
        feed.on_message(&payload("A1")).await;
        let before = feed.snapshot().await;

        assert!(!feed.on_message("not json at all").await);
        assert!(!feed.on_message(r#"{"awardId": 5}"#).await);

        assert_eq!(feed.snapshot().await, before);
        assert_eq!(feed.discarded_count(), 2);
    }

    #[tokio::test]
    async fn capacity_is_enforced_on_insert() {
        let feed = AwardFeed::new();
        for n in 1..=201 {
            feed.on_message(&payload(&format!("A{n}"))).await;
            assert!(feed.len().await <= AWARD_FEED_CAPACITY);
        }
        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.first().map(|e| e.award.award_id.as_str()), Some("A201"));
        assert_eq!(snapshot.last().map(|e| e.award.award_id.as_str()), Some("A2"));
    }

    #[tokio::test]
    async fn repeated_award_id_is_not_deduplicated() {
        let feed = AwardFeed::new();
        feed.on_message(&payload("same")).await;
        feed.on_message(&payload("same")).await;
        assert_eq!(feed.len().await, 2);
    }

    #[tokio::test]
    async fn receipt_order_not_timestamp_order() {
        let feed = AwardFeed::new();
        let late = r#"{"awardId":"late","eventId":"e","userId":"u","offerId":1,"stake":1,"bonusAmount":0.1,"ts":2000}"#;
        let early = r#"{"awardId":"early","eventId":"e","userId":"u","offerId":1,"stake":1,"bonusAmount":0.1,"ts":1000}"#;
        feed.on_message(late).await;
        feed.on_message(early).await;
        assert_eq!(ids(&feed.snapshot().await), vec!["early", "late"]);
    }

    #[tokio::test]
    async fn accepted_awards_are_published() {
        let feed = AwardFeed::new();
        let mut rx = feed.subscribe();
        feed.on_message("garbage").await;
        feed.on_message(&payload("A9")).await;

        let Ok(entry) = rx.recv().await else {
            panic!("expected a published entry");
        };
        assert_eq!(entry.award.award_id, AwardId::new("A9"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_still_buffers() {
        let feed = AwardFeed::new();
        assert!(feed.on_message(&payload("unseen")).await);
        assert_eq!(feed.len().await, 1);

        let mut late = feed.subscribe();
        assert!(drain_pending(&mut late).is_empty());
    }

    #[tokio::test]
    async fn queued_awards_are_drained_in_arrival_order() {
        let feed = AwardFeed::new();
        let mut rx = feed.subscribe();
        feed.on_message(&payload("A1")).await;
        feed.on_message(&payload("A2")).await;
        feed.on_message(&payload("A3")).await;

        let drained = drain_pending(&mut rx);
        assert_eq!(ids(&drained), vec!["A1", "A2", "A3"]);
        assert!(drain_pending(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn backfill_goes_behind_live_entries() {
        let feed = AwardFeed::with_capacity(3);
        feed.on_message(&payload("live")).await;

        let history: Vec<Award> = ["h3", "h2", "h1"]
            .iter()
            .map(|id| Award {
                award_id: AwardId::new(*id),
                event_id: "e".to_string(),
                user_id: "u".to_string(),
                offer_id: OfferId::new(1),
                stake: 1.0,
                bonus_amount: 0.1,
                ts: None,
                created_at: DateTime::from_timestamp(1_700_000_000, 0),
            })
            .collect();
        let stored = feed.backfill(history).await;

        assert_eq!(stored, 2);
        let snapshot = feed.snapshot().await;
        assert_eq!(ids(&snapshot), vec!["live", "h3", "h2"]);
        let Some(h3) = snapshot.get(1) else {
            panic!("expected a backfilled entry");
        };
        assert_eq!(h3.received_at.timestamp(), 1_700_000_000);
    }
}
