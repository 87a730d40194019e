//! Rule registry controller: offer list, edit session, and CRUD sync.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::api::OffersApi;
use crate::domain::{EditSession, Offer, OfferDraft, OfferId};
use crate::error::RegistryError;

/// Mutable view state owned by the controller.
#[derive(Debug, Default)]
struct RegistryState {
    offers: Vec<Offer>,
    session: EditSession,
    last_error: Option<RegistryError>,
    torn_down: bool,
}

/// Clears the in-flight flag when a submit ends, including when its future
/// is dropped mid-request.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps the local offer list and edit form in step with the backend.
///
/// State sits behind a [`RwLock`] that is never held across a network
/// call, so concurrent operations interleave at their completion points:
///
/// - `refresh` replaces the offer list wholesale with whatever response it
///   processes, so two racing refreshes apply in completion order.
/// - `submit` is rejected while another submit is in flight. Dropping a
///   pending `submit` future ends its in-flight window.
/// - after [`RuleRegistry::shutdown`], completions no longer touch state.
#[derive(Debug)]
pub struct RuleRegistry<A> {
    api: A,
    state: RwLock<RegistryState>,
    submitting: AtomicBool,
}

impl<A: OffersApi> RuleRegistry<A> {
    /// Creates a controller with an empty offer list and a fresh
    /// "creating" session.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RwLock::new(RegistryState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    /// Fetches the full offer set and replaces the local list with it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Fetch`] if the request fails. The error is
    /// recorded as the last error and the local list is left as it was.
    pub async fn refresh(&self) -> Result<(), RegistryError> {
        let result = self.api.list_offers().await;

        let mut state = self.state.write().await;
        match result {
            Ok(offers) => {
                if state.torn_down {
                    tracing::debug!("discarding offer list received after shutdown");
                } else {
                    tracing::info!(count = offers.len(), "offers refreshed");
                    state.offers = offers;
                }
                Ok(())
            }
            Err(source) => {
                let err = RegistryError::Fetch(source);
                tracing::warn!(error = %err, cause = ?err.api_error(), "offer refresh failed");
                if !state.torn_down {
                    state.last_error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// Submits the current draft.
    ///
    /// Issues an update when the session is editing an offer, otherwise a
    /// create. On success the session returns to "creating" with the
    /// default draft and the offer list is refreshed; a failed refresh is
    /// recorded as the last error but does not fail the submit. On failure
    /// the session and draft are left untouched.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::SubmitInFlight`] if another submit has not
    ///   finished; nothing is sent and nothing is recorded.
    /// - [`RegistryError::InvalidDraft`] if the draft fails validation;
    ///   nothing is sent.
    /// - [`RegistryError::Create`] or [`RegistryError::Update`] if the
    ///   backend rejects the request.
    pub async fn submit(&self) -> Result<(), RegistryError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RegistryError::SubmitInFlight);
        }
        let _in_flight = SubmitGuard(&self.submitting);

        let (target, draft) = {
            let mut state = self.state.write().await;
            state.last_error = None;
            if let Err(err) = state.session.draft().validate() {
                state.last_error = Some(err.clone());
                return Err(err);
            }
            (state.session.target(), state.session.draft().clone())
        };

        let result = match target {
            Some(id) => self
                .api
                .update_offer(id, &draft)
                .await
                .map(|()| {
                    tracing::info!(offer_id = %id, "offer updated");
                })
                .map_err(|source| RegistryError::Update { id, source }),
            None => self
                .api
                .create_offer(&draft)
                .await
                .map(|created| {
                    tracing::info!(offer_id = ?created.map(OfferId::get), "offer created");
                })
                .map_err(RegistryError::Create),
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, cause = ?err.api_error(), "offer submit failed");
            let mut state = self.state.write().await;
            if !state.torn_down {
                state.last_error = Some(err.clone());
            }
            return Err(err);
        }

        {
            let mut state = self.state.write().await;
            if !state.torn_down {
                state.session.reset();
            }
        }

        // Already recorded as the last error by `refresh`.
        let _ = self.refresh().await;

        Ok(())
    }

    /// Switches the session to editing `offer`, snapshotting its fields
    /// into the draft.
    pub async fn begin_edit(&self, offer: &Offer) {
        let mut state = self.state.write().await;
        state.session.begin_edit(offer);
        tracing::debug!(offer_id = %offer.id, "editing offer");
    }

    /// Abandons the current edit and returns to "creating" with the
    /// default draft.
    pub async fn cancel_edit(&self) {
        self.state.write().await.session.reset();
    }

    /// Replaces the draft, keeping the edit mode.
    pub async fn set_draft(&self, draft: OfferDraft) {
        *self.state.write().await.session.draft_mut() = draft;
    }

    /// Applies `f` to the draft in place, keeping the edit mode.
    pub async fn edit_draft<F>(&self, f: F)
    where
        F: FnOnce(&mut OfferDraft),
    {
        f(self.state.write().await.session.draft_mut());
    }

    /// Stops applying request completions to local state.
    ///
    /// Requests already sent still run to completion at the backend.
    pub async fn shutdown(&self) {
        self.state.write().await.torn_down = true;
        tracing::debug!("rule registry shut down");
    }

    /// Snapshot of the offer list in server order.
    pub async fn offers(&self) -> Vec<Offer> {
        self.state.read().await.offers.clone()
    }

    /// Looks up a listed offer by id.
    pub async fn offer(&self, id: OfferId) -> Option<Offer> {
        self.state
            .read()
            .await
            .offers
            .iter()
            .find(|offer| offer.id == id)
            .cloned()
    }

    /// Snapshot of the edit session.
    pub async fn session(&self) -> EditSession {
        self.state.read().await.session.clone()
    }

    /// Snapshot of the draft.
    pub async fn draft(&self) -> OfferDraft {
        self.state.read().await.session.draft().clone()
    }

    /// Most recent recorded error.
    pub async fn last_error(&self) -> Option<RegistryError> {
        self.state.read().await.last_error.clone()
    }

    /// Most recent recorded error as the message shown to the user.
    pub async fn last_error_message(&self) -> Option<String> {
        self.state
            .read()
            .await
            .last_error
            .as_ref()
            .map(ToString::to_string)
    }

    /// Returns `true` while a submit is in flight.
    pub async fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }
}
