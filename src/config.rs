// SPDX-License-Identifier: MPL-2.0

pub const APP_DIR: &str = "quad";
pub const DB_FILE: &str = "social.db";

/// Grapheme budget for notification excerpts, trailing ellipsis included.
pub const EXCERPT_GRAPHEMES: usize = 120;

/// Posts per page in the feed and per-author listings.
pub const FEED_PAGE_SIZE: i64 = 10;

/// Comments per page under a post.
pub const COMMENTS_PAGE_SIZE: i64 = 10;

/// Notifications per page.
pub const NOTIFICATIONS_PAGE_SIZE: i64 = 20;

/// Search result caps.
pub const SEARCH_PEOPLE_LIMIT: i64 = 20;
pub const SEARCH_POSTS_LIMIT: i64 = 50;
