//! Live award feed: push connection lifecycle and the bounded award buffer.
//!
//! [`AwardFeed`] owns the buffer and hands out [`FeedConnection`]s. A
//! connection moves `Connecting → Open → Closed` and never reconnects;
//! resuming after `Closed` means calling [`AwardFeed::connect`] again.

pub mod connection;
pub mod ingestor;
pub mod phase;

pub use connection::FeedConnection;
pub use ingestor::{AwardFeed, drain_pending};
pub use phase::ConnectionPhase;
