// SPDX-License-Identifier: MPL-2.0

//! The operation surface: accounts, posts, comments, toggles, notifications,
//! search, staff analytics, and counter reconciliation.
//!
//! Every write operation runs as a single transaction on the shared
//! connection, so a counter bump, the row mutation that caused it, and any
//! notification fan-out land together or not at all.

mod accounts;
mod analytics;
mod notifications;
mod posts;
mod reconcile;
mod search;
mod social;

pub use analytics::{
    CommentsSummary, LatestPost, LatestUser, LikesSummary, PostsSummary, TopAuthor, TopPost,
    UsersSummary,
};
pub use reconcile::CounterDrift;
pub use search::{PersonHit, SearchResults};
pub use social::{LikeToggle, SaveToggle};

use crate::store::{SocialDb, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("cannot follow yourself")]
    SelfFollow,
    #[error("email already registered")]
    EmailTaken,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        EngineError::Store(StoreError::Database(e))
    }
}

/// Name the entity behind a store-level `NotFound` as it crosses into the
/// engine's error taxonomy.
pub(crate) fn not_found(entity: &'static str) -> impl FnOnce(StoreError) -> EngineError {
    move |e| match e {
        StoreError::NotFound => EngineError::NotFound(entity),
        other => EngineError::Store(other),
    }
}

/// The engine. Cheap to clone; clones share the underlying database handle.
#[derive(Clone)]
pub struct Engine {
    db: SocialDb,
}

impl Engine {
    pub fn new(db: SocialDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &SocialDb {
        &self.db
    }
}
