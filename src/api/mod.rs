//! Offers backend boundary: the CRUD contract and its HTTP implementation.
//!
//! [`OffersApi`] is the seam the rule registry is written against. The
//! production implementation is [`HttpOffersClient`]; tests substitute a
//! scripted fake.

pub mod dto;
pub mod http_client;

pub use http_client::HttpOffersClient;

use crate::domain::{Award, Offer, OfferDraft, OfferId};
use crate::error::ApiError;

/// Request/response contract of the offers backend.
///
/// Every method maps one HTTP exchange. A non-success status is reported as
/// [`ApiError::Status`]; callers decide which registry error kind it becomes.
pub trait OffersApi: Send + Sync {
    /// `GET /offers` — the full offer set in server order.
    fn list_offers(&self) -> impl Future<Output = Result<Vec<Offer>, ApiError>> + Send;

    /// `POST /offers` — creates an offer, returning its id when the backend
    /// reports one.
    fn create_offer(
        &self,
        draft: &OfferDraft,
    ) -> impl Future<Output = Result<Option<OfferId>, ApiError>> + Send;

    /// `PUT /offers/{id}` — overwrites the editable fields of an offer.
    fn update_offer(
        &self,
        id: OfferId,
        draft: &OfferDraft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /awards?limit=N` — most recent persisted awards, newest first.
    fn recent_awards(&self, limit: usize)
    -> impl Future<Output = Result<Vec<Award>, ApiError>> + Send;
}
