//! The single in-progress create/edit form of the rule registry.

use super::{Offer, OfferDraft, OfferId};

/// Whether the form creates a new offer or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Submitting issues `POST /offers`.
    #[default]
    Creating,
    /// Submitting issues `PUT /offers/{target}`.
    Editing {
        /// Offer being edited.
        target: OfferId,
    },
}

/// Edit mode paired with the draft the user is working on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditSession {
    mode: EditMode,
    draft: OfferDraft,
}

impl EditSession {
    /// A fresh "creating" session with the default draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to editing `offer`, replacing the draft with a snapshot of
    /// its current fields. Unsaved draft changes are discarded.
    pub fn begin_edit(&mut self, offer: &Offer) {
        self.mode = EditMode::Editing { target: offer.id };
        self.draft = offer.to_draft();
    }

    /// Returns to "creating" with the default draft.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    /// Offer targeted by the session, if editing.
    #[must_use]
    pub const fn target(&self) -> Option<OfferId> {
        match self.mode {
            EditMode::Creating => None,
            EditMode::Editing { target } => Some(target),
        }
    }

    /// The in-progress draft.
    #[must_use]
    pub const fn draft(&self) -> &OfferDraft {
        &self.draft
    }

    /// Mutable access to the draft (form input).
    pub fn draft_mut(&mut self) -> &mut OfferDraft {
        &mut self.draft
    }
}
