// SPDX-License-Identifier: MPL-2.0

use crate::types::{NotificationPayload, NotificationView};
use rusqlite::{Connection, params};

use crate::store::StoreError;

/// Insert a notification. The verb column is derived from the payload and
/// stored alongside the JSON for direct querying.
pub fn insert(
    conn: &Connection,
    recipient_id: i64,
    actor_id: Option<i64>,
    payload: &NotificationPayload,
    now: &str,
) -> Result<i64, StoreError> {
    let json = serde_json::to_string(payload)?;
    conn.execute(
        r#"
        INSERT INTO notifications (recipient_id, actor_id, verb, payload, is_read, created_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5)
        "#,
        params![recipient_id, actor_id, payload.verb(), json, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// One page of a recipient's notifications, newest first, actor resolved.
pub fn recipient_page(
    conn: &Connection,
    recipient_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<NotificationView>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT n.id, n.actor_id, n.payload, n.is_read, n.created_at,
               u.email, pr.full_name
        FROM notifications n
        LEFT JOIN users u ON u.id = n.actor_id
        LEFT JOIN profiles pr ON pr.user_id = n.actor_id
        WHERE n.recipient_id = ?1
        ORDER BY n.created_at DESC, n.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )?;

    let mut rows = stmt.query(params![recipient_id, limit, offset])?;
    let mut views = Vec::new();
    while let Some(row) = rows.next()? {
        let payload_json: String = row.get(2)?;
        let payload: NotificationPayload = serde_json::from_str(&payload_json)?;

        let actor_id: Option<i64> = row.get(1)?;
        let email: Option<String> = row.get(5)?;
        let full_name: Option<String> = row.get(6)?;
        let actor_name = match (&actor_id, email) {
            (Some(_), Some(email)) => {
                crate::store::posts::display_name(full_name.as_deref(), &email)
            }
            _ => "Someone".to_string(),
        };

        views.push(NotificationView {
            id: row.get(0)?,
            actor_id,
            actor_name,
            payload,
            is_read: row.get::<_, i32>(3)? != 0,
            created_at: row.get(4)?,
        });
    }

    Ok(views)
}

pub fn count_for_recipient(conn: &Connection, recipient_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?",
        [recipient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn unread_count(conn: &Connection, recipient_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0",
        [recipient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Mark one notification read, scoped to its recipient. Returns false when
/// no row matches (absent, or belongs to someone else). Marking an
/// already-read row matches and returns true, so the operation is
/// idempotent for the owner.
pub fn mark_read(conn: &Connection, recipient_id: i64, notif_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND recipient_id = ?2",
        params![notif_id, recipient_id],
    )?;
    Ok(changed == 1)
}

/// Mark every unread notification read; returns how many rows changed.
pub fn mark_all_read(conn: &Connection, recipient_id: i64) -> Result<usize, StoreError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE recipient_id = ? AND is_read = 0",
        [recipient_id],
    )?;
    Ok(changed)
}

/// Delete all of a recipient's notifications; returns how many went.
pub fn delete_all(conn: &Connection, recipient_id: i64) -> Result<usize, StoreError> {
    let changed = conn.execute(
        "DELETE FROM notifications WHERE recipient_id = ?",
        [recipient_id],
    )?;
    Ok(changed)
}
