//! Bonus award events delivered over the live feed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::OfferId;
use crate::error::FeedError;

/// Server-assigned award identifier.
///
/// Not used for deduplication: the same id arriving twice yields two feed
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AwardId(String);

impl AwardId {
    /// Wraps a raw award id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AwardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bonus granted to a user under some offer. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    /// Unique per emitted event.
    pub award_id: AwardId,
    /// Qualifying bet event.
    pub event_id: String,
    /// Rewarded user.
    pub user_id: String,
    /// Offer the award was issued under. Not checked against the registry.
    pub offer_id: OfferId,
    /// Qualifying stake.
    pub stake: f64,
    /// Bonus computed by the backend.
    pub bonus_amount: f64,
    /// Emission time in Unix epoch milliseconds. Any JSON number is
    /// accepted; fractional milliseconds are dropped.
    #[serde(
        default,
        deserialize_with = "epoch_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub ts: Option<i64>,
    /// Persistence time, present on awards listed via `GET /awards`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Award {
    /// Parses a push payload.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Parse`] if the payload is not a JSON award.
    pub fn parse(payload: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Emission time from `ts`, if present and representable.
    #[must_use]
    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        self.ts.and_then(DateTime::from_timestamp_millis)
    }
}

/// Reads an optional epoch-milliseconds number written as an integer or a
/// float. Non-finite values are treated as absent.
fn epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<f64>::deserialize(deserializer)?;
    Ok(millis.filter(|ms| ms.is_finite()).map(|ms| ms.trunc() as i64))
}

/// An award as held in the feed: the award plus when it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// The received award.
    pub award: Award,
    /// Local receipt time.
    pub received_at: DateTime<Utc>,
}

impl FeedEntry {
    /// Pairs an award with its receipt time.
    #[must_use]
    pub const fn new(award: Award, received_at: DateTime<Utc>) -> Self {
        Self { award, received_at }
    }

    /// Time shown for this entry: emission time, else receipt time.
    ///
    /// Display only; the feed is never re-sorted by it.
    #[must_use]
    pub fn display_time(&self) -> DateTime<Utc> {
        self.award.emitted_at().unwrap_or(self.received_at)
    }
}
