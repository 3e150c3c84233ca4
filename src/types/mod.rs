// SPDX-License-Identifier: MPL-2.0

mod notification;
mod page;
mod post;
mod user;

pub use notification::{Notification, NotificationPayload, NotificationView};
pub use page::Page;
pub(crate) use page::{clamp_page, total_pages};
pub use post::{Comment, CommentView, Post, PostDraft, PostOverview, PostView};
pub use user::{AcademicYear, FollowEntry, Major, Profile, ProfileUpdate, User, UserOverview};
