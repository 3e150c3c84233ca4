// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

/// A post as stored, counters included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub text: String,
    /// Caller-supplied path or URL; the engine never interprets it.
    pub photo: Option<String>,
    pub is_edited: bool,
    pub created_at: String,
    pub updated_at: String,
    pub comments_count: i64,
    pub likes_count: i64,
    pub saves_count: i64,
}

/// Input for creating or editing a post. A draft must carry text, a photo,
/// or both; leading and trailing whitespace in the text is not content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub photo: Option<String>,
}

impl PostDraft {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.photo.is_none()
    }
}

/// A post assembled for display: author card plus the viewer's own flags.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub author_name: String,
    pub author_email: String,
    pub author_photo: Option<String>,
    pub is_liked: bool,
    pub is_saved: bool,
    pub is_commented: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub body: String,
    pub is_edited: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A comment assembled for display under a post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author_name: String,
    pub author_email: String,
    pub author_photo: Option<String>,
    /// Whether the viewer wrote this comment (edit/delete affordances).
    pub is_owner: bool,
}

/// Compact post card used by the staff dashboard tables, search results,
/// and notification target resolution.
#[derive(Debug, Clone, Serialize)]
pub struct PostOverview {
    pub id: i64,
    pub text: String,
    pub photo: Option<String>,
    pub created_at: String,
    pub author_id: i64,
    pub author_name: String,
    pub author_photo: Option<String>,
    /// Live count of comment rows, not the denormalized counter.
    pub comments_count: i64,
    /// The denormalized counter, as the dashboard reports it.
    pub likes_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_empty_detection() {
        assert!(PostDraft::default().is_empty());
        assert!(
            PostDraft {
                text: "   \n\t ".to_string(),
                photo: None,
            }
            .is_empty()
        );
        assert!(
            !PostDraft {
                text: String::new(),
                photo: Some("post/pic.jpg".to_string()),
            }
            .is_empty()
        );
        assert!(
            !PostDraft {
                text: "hello".to_string(),
                photo: None,
            }
            .is_empty()
        );
    }
}
