// SPDX-License-Identifier: MPL-2.0

use crate::config::NOTIFICATIONS_PAGE_SIZE;
use crate::engine::{Engine, EngineError};
use crate::store::{StoreError, notifications, posts};
use crate::types::{NotificationPayload, NotificationView, Page, PostOverview, clamp_page, total_pages};
use tracing::info;

impl Engine {
    /// The recipient's notifications, newest first.
    pub fn notifications(
        &self,
        recipient_id: i64,
        page: i64,
    ) -> Result<Page<NotificationView>, EngineError> {
        let conn = self.db.conn();
        let total_items = notifications::count_for_recipient(&conn, recipient_id)?;
        let pages = total_pages(total_items, NOTIFICATIONS_PAGE_SIZE);
        let page = clamp_page(page, pages);
        let items = notifications::recipient_page(
            &conn,
            recipient_id,
            NOTIFICATIONS_PAGE_SIZE,
            (page - 1) * NOTIFICATIONS_PAGE_SIZE,
        )?;

        Ok(Page {
            items,
            page,
            page_size: NOTIFICATIONS_PAGE_SIZE,
            total_items,
            total_pages: pages,
        })
    }

    /// Mark one notification read. Marking an already-read notification is a
    /// no-op; a notification that does not exist or belongs to someone else
    /// is reported as missing.
    pub fn mark_notification_read(
        &self,
        recipient_id: i64,
        notification_id: i64,
    ) -> Result<(), EngineError> {
        let conn = self.db.conn();
        if !notifications::mark_read(&conn, recipient_id, notification_id)? {
            return Err(EngineError::NotFound("notification"));
        }
        Ok(())
    }

    /// Mark every unread notification read; returns how many rows changed.
    pub fn mark_all_read(&self, recipient_id: i64) -> Result<usize, EngineError> {
        let conn = self.db.conn();
        Ok(notifications::mark_all_read(&conn, recipient_id)?)
    }

    pub fn unread_count(&self, recipient_id: i64) -> Result<i64, EngineError> {
        let conn = self.db.conn();
        Ok(notifications::unread_count(&conn, recipient_id)?)
    }

    /// Clear the recipient's notifications; returns how many were deleted.
    pub fn delete_all_notifications(&self, recipient_id: i64) -> Result<usize, EngineError> {
        let conn = self.db.conn();
        let deleted = notifications::delete_all(&conn, recipient_id)?;
        info!(recipient_id, deleted, "notifications cleared");
        Ok(deleted)
    }

    /// Resolve the post a notification points at, if it still exists.
    ///
    /// Follow notifications have no target. Like and comment notifications
    /// keep their post id in the payload, so a post deleted after the
    /// notification was written resolves to `None` rather than an error.
    pub fn notification_target(
        &self,
        payload: &NotificationPayload,
    ) -> Result<Option<PostOverview>, EngineError> {
        let Some(post_id) = payload.post_id() else {
            return Ok(None);
        };

        let conn = self.db.conn();
        match posts::get_post_overview(&conn, post_id) {
            Ok(overview) => Ok(Some(overview)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
