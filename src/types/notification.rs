// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

/// What a notification is about, tagged by kind so consumers can match
/// exhaustively instead of probing optional fields.
///
/// Excerpts are bounded by [`crate::excerpt::excerpt`] at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    PostLiked {
        post_id: i64,
        post_excerpt: String,
    },
    Commented {
        post_id: i64,
        post_excerpt: String,
        comment_excerpt: String,
    },
    Followed,
}

impl NotificationPayload {
    /// Fixed verb string the notification list renders. These exact strings
    /// are a presentation contract.
    pub fn verb(&self) -> &'static str {
        match self {
            NotificationPayload::PostLiked { .. } => "liked",
            NotificationPayload::Commented { .. } => "commented",
            NotificationPayload::Followed => "started following you",
        }
    }

    /// The post this notification points at, if any.
    pub fn post_id(&self) -> Option<i64> {
        match self {
            NotificationPayload::PostLiked { post_id, .. } => Some(*post_id),
            NotificationPayload::Commented { post_id, .. } => Some(*post_id),
            NotificationPayload::Followed => None,
        }
    }

    /// One-line preview: the comment excerpt when there is one, else the
    /// post excerpt.
    pub fn preview(&self) -> Option<&str> {
        match self {
            NotificationPayload::PostLiked { post_excerpt, .. } => Some(post_excerpt),
            NotificationPayload::Commented {
                comment_excerpt, ..
            } => Some(comment_excerpt),
            NotificationPayload::Followed => None,
        }
    }
}

/// A notification row. `actor_id` is `None` when the acting account has
/// since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub actor_id: Option<i64>,
    pub payload: NotificationPayload,
    pub is_read: bool,
    pub created_at: String,
}

/// A notification assembled for display, actor name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: i64,
    pub actor_id: Option<i64>,
    /// Actor's full name, else their email, else "Someone" when the actor
    /// account is gone.
    pub actor_name: String,
    pub payload: NotificationPayload,
    pub is_read: bool,
    pub created_at: String,
}

impl NotificationView {
    pub fn verb(&self) -> &'static str {
        self.payload.verb()
    }

    pub fn preview(&self) -> Option<&str> {
        self.payload.preview()
    }
}
