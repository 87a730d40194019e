//! # offers-console
//!
//! Operator client for promotional offer rules and the live stream of bonus
//! awards issued against them.
//!
//! Two components keep two independently-updating views in step with the
//! backend. They share no state:
//!
//! - [`registry::RuleRegistry`] lists offers and drives the single
//!   create/edit form over request/response CRUD.
//! - [`feed::AwardFeed`] holds the 200 most recent awards received over a
//!   WebSocket push connection, newest first.
//!
//! ## Architecture
//!
//! ```text
//! Offers backend (HTTP)          Award gateway (WebSocket)
//!     │                               │
//!     ├── OffersApi (api/)            ├── FeedConnection (feed/)
//!     │                               │
//!     ├── RuleRegistry (registry/)    ├── AwardFeed (feed/)
//!     │                               │
//!     ├── EditSession (domain/)       ├── AwardBuffer (domain/)
//!     │                               │
//!     └──────────── console binary (render/) ────┘
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod registry;
pub mod render;
