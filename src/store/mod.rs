// SPDX-License-Identifier: MPL-2.0

mod db;
mod schema;

pub mod comments;
pub mod notifications;
pub mod posts;
pub mod social;
pub mod users;

pub use db::SocialDb;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
    #[error("database path error: {0}")]
    Path(String),
}
