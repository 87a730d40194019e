//! Domain layer: offers, the edit session, awards, and the award buffer.
//!
//! Types here are plain data plus the invariants that belong to them
//! (the draft's validation, the buffer's length bound). Network and
//! synchronization concerns live in [`crate::registry`] and [`crate::feed`].

pub mod award;
pub mod award_buffer;
pub mod edit_session;
pub mod offer;

pub use award::{Award, AwardId, FeedEntry};
pub use award_buffer::{AWARD_FEED_CAPACITY, AwardBuffer};
pub use edit_session::{EditMode, EditSession};
pub use offer::{Offer, OfferDraft, OfferId};
