//! Wire shapes that are not domain types.
//!
//! Offers and awards travel as [`crate::domain::Offer`],
//! [`crate::domain::OfferDraft`] and [`crate::domain::Award`] directly.

use serde::Deserialize;

use crate::domain::OfferId;

/// Response body of `POST /offers`.
///
/// The backend answers `{"id": n}`; a full offer body also matches since
/// only `id` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOffer {
    /// Id assigned by the backend.
    #[serde(default)]
    pub id: Option<OfferId>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendError {
    /// Backend diagnostic.
    pub error: String,
}
