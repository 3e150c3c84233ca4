// SPDX-License-Identifier: MPL-2.0

//! Core engine for a university campus social network.
//!
//! The crate owns the data model (users, profiles, posts, comments, likes,
//! follows, saved posts, notifications), the denormalized counters that ride
//! on posts and profiles, and the notification fan-out that social actions
//! produce. Everything is exposed through [`Engine`], backed by an embedded
//! SQLite database ([`SocialDb`]). HTTP, auth, and rendering are the
//! embedding application's business.

pub mod config;
pub mod engine;
pub mod excerpt;
pub mod store;
pub mod types;

pub use engine::{Engine, EngineError};
pub use store::{SocialDb, StoreError};
