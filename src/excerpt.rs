// SPDX-License-Identifier: MPL-2.0

//! Bounded text excerpts for notification payloads.
//!
//! Notifications carry a short preview of the post (and comment) they refer
//! to instead of the full text, so the notification store does not grow with
//! content size. The budget is counted in grapheme clusters, not bytes, so
//! multi-byte text is never cut mid-character.

use crate::config::EXCERPT_GRAPHEMES;
use unicode_segmentation::UnicodeSegmentation;

/// Excerpt `text` to the standard notification budget.
pub fn excerpt(text: &str) -> String {
    truncate_graphemes(text, EXCERPT_GRAPHEMES)
}

/// Truncate `text` to at most `budget` grapheme clusters.
///
/// When the text is over budget, the last kept cluster is replaced by a
/// single `…`, so the result never exceeds `budget` clusters in total.
/// Text at or under budget is returned unchanged.
pub fn truncate_graphemes(text: &str, budget: usize) -> String {
    if budget == 0 {
        return String::new();
    }
    if text.graphemes(true).count() <= budget {
        return text.to_string();
    }
    let kept: String = text.graphemes(true).take(budget - 1).collect();
    format!("{kept}…")
}
