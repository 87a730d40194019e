//! Offer rules and the draft form used to create or edit them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Server-assigned identifier of a persisted offer.
///
/// Present only on offers the backend has confirmed; a draft never carries
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(i64);

impl OfferId {
    /// Wraps a raw backend id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw backend id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for OfferId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A persisted bonus rule as returned by `GET /offers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Backend identifier (immutable).
    pub id: OfferId,
    /// Display name.
    pub name: String,
    /// Minimum qualifying stake.
    pub min_stake: f64,
    /// Bonus fraction of the stake, conventionally in `0..=1`.
    pub bonus_pct: f64,
    /// Whether the rule currently awards bonuses.
    pub active: bool,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Snapshots the editable fields of this offer into a draft.
    #[must_use]
    pub fn to_draft(&self) -> OfferDraft {
        OfferDraft {
            name: self.name.clone(),
            min_stake: self.min_stake,
            bonus_pct: self.bonus_pct,
            active: self.active,
        }
    }
}

/// Editable offer fields: the request body of `POST /offers` and
/// `PUT /offers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
    /// Display name.
    pub name: String,
    /// Minimum qualifying stake.
    pub min_stake: f64,
    /// Bonus fraction of the stake.
    pub bonus_pct: f64,
    /// Whether the rule is active.
    pub active: bool,
}

impl Default for OfferDraft {
    fn default() -> Self {
        Self {
            name: "10% bonus >= £10".to_string(),
            min_stake: 10.0,
            bonus_pct: 0.10,
            active: true,
        }
    }
}

impl OfferDraft {
    /// Checks the draft before it is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDraft`] if the minimum stake is
    /// negative or not finite, or the bonus percentage is not finite.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if !self.min_stake.is_finite() || self.min_stake < 0.0 {
            return Err(RegistryError::InvalidDraft(
                "minimum stake must be a non-negative number".to_string(),
            ));
        }
        if !self.bonus_pct.is_finite() {
            return Err(RegistryError::InvalidDraft(
                "bonus percentage must be a number".to_string(),
            ));
        }
        Ok(())
    }
}
