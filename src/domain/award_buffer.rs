//! Bounded, newest-first buffer of feed entries.
//!
//! [`AwardBuffer`] is a ring over a [`VecDeque`]: inserting at the front
//! evicts from the back once capacity is reached, so the length bound holds
//! after every operation rather than being restored by truncation.

use std::collections::VecDeque;

use super::FeedEntry;

/// Number of awards the live feed keeps.
pub const AWARD_FEED_CAPACITY: usize = 200;

/// Newest-first ring of [`FeedEntry`] values.
#[derive(Debug, Clone)]
pub struct AwardBuffer {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
}

impl AwardBuffer {
    /// Creates an empty buffer holding [`AWARD_FEED_CAPACITY`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(AWARD_FEED_CAPACITY)
    }

    /// Creates an empty buffer with a custom bound (at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts `entry` as the newest element.
    ///
    /// Returns the evicted oldest entry when the buffer was full.
    pub fn push_front(&mut self, entry: FeedEntry) -> Option<FeedEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(entry);
        evicted
    }

    /// Appends older entries behind the current ones, newest-first, until
    /// the buffer is full. Returns how many were appended.
    pub fn extend_back<I>(&mut self, older: I) -> usize
    where
        I: IntoIterator<Item = FeedEntry>,
    {
        let room = self.capacity.saturating_sub(self.entries.len());
        let before = self.entries.len();
        self.entries.extend(older.into_iter().take(room));
        self.entries.len() - before
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently received entry.
    #[must_use]
    pub fn newest(&self) -> Option<&FeedEntry> {
        self.entries.front()
    }

    /// Oldest retained entry.
    #[must_use]
    pub fn oldest(&self) -> Option<&FeedEntry> {
        self.entries.back()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }
}

impl Default for AwardBuffer {
    fn default() -> Self {
        Self::new()
    }
}
