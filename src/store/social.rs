// SPDX-License-Identifier: MPL-2.0

//! Row-level helpers for the three pair tables: likes, saves, follows.
//!
//! Creation uses `INSERT ... ON CONFLICT DO NOTHING` and reports through the
//! change count, so the unique pair constraint is the final arbiter: a
//! concurrent duplicate reads as "already present", never as an error.
//! Deletion is no-op-safe the same way.

use crate::types::{FollowEntry, PostView};
use rusqlite::{Connection, params};

use crate::store::StoreError;
use crate::store::posts::row_to_post_view;

/// Returns true when the like was created, false when it already existed.
pub fn insert_like_if_absent(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    now: &str,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        r#"
        INSERT INTO likes (user_id, post_id, created_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, post_id) DO NOTHING
        "#,
        params![user_id, post_id, now],
    )?;
    Ok(changed == 1)
}

/// Returns true when a row was deleted.
pub fn delete_like(conn: &Connection, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
    )?;
    Ok(changed == 1)
}

pub fn insert_save_if_absent(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    now: &str,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        r#"
        INSERT INTO saved_posts (user_id, post_id, created_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, post_id) DO NOTHING
        "#,
        params![user_id, post_id, now],
    )?;
    Ok(changed == 1)
}

pub fn delete_save(conn: &Connection, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "DELETE FROM saved_posts WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
    )?;
    Ok(changed == 1)
}

pub fn insert_follow_if_absent(
    conn: &Connection,
    follower_id: i64,
    following_id: i64,
    now: &str,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        r#"
        INSERT INTO follows (follower_id, following_id, created_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(follower_id, following_id) DO NOTHING
        "#,
        params![follower_id, following_id, now],
    )?;
    Ok(changed == 1)
}

pub fn delete_follow(
    conn: &Connection,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
    )?;
    Ok(changed == 1)
}

pub fn is_following(
    conn: &Connection,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, StoreError> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM follows WHERE follower_id = ?1 AND following_id = ?2")?;
    Ok(stmt.exists(params![follower_id, following_id])?)
}

/// Users who follow `target`, each annotated with whether `viewer` follows
/// them back.
pub fn followers_of(
    conn: &Connection,
    viewer: i64,
    target: i64,
) -> Result<Vec<FollowEntry>, StoreError> {
    follow_list(
        conn,
        viewer,
        target,
        r#"
        SELECT u.id, u.email, pr.full_name, pr.photo,
               EXISTS(SELECT 1 FROM follows v
                      WHERE v.follower_id = ?1 AND v.following_id = u.id)
        FROM follows f
        JOIN users u ON u.id = f.follower_id
        LEFT JOIN profiles pr ON pr.user_id = u.id
        WHERE f.following_id = ?2
        ORDER BY f.created_at DESC, f.id DESC
        "#,
    )
}

/// Users `target` follows, each annotated with whether `viewer` follows them.
pub fn following_of(
    conn: &Connection,
    viewer: i64,
    target: i64,
) -> Result<Vec<FollowEntry>, StoreError> {
    follow_list(
        conn,
        viewer,
        target,
        r#"
        SELECT u.id, u.email, pr.full_name, pr.photo,
               EXISTS(SELECT 1 FROM follows v
                      WHERE v.follower_id = ?1 AND v.following_id = u.id)
        FROM follows f
        JOIN users u ON u.id = f.following_id
        LEFT JOIN profiles pr ON pr.user_id = u.id
        WHERE f.follower_id = ?2
        ORDER BY f.created_at DESC, f.id DESC
        "#,
    )
}

fn follow_list(
    conn: &Connection,
    viewer: i64,
    target: i64,
    sql: &str,
) -> Result<Vec<FollowEntry>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params![viewer, target])?;

    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        let email: String = row.get(1)?;
        let full_name: Option<String> = row.get(2)?;
        let display_name = crate::store::posts::display_name(full_name.as_deref(), &email);

        entries.push(FollowEntry {
            user_id: row.get(0)?,
            email,
            display_name,
            photo: row.get(3)?,
            is_following: row.get::<_, i32>(4)? != 0,
        });
    }

    Ok(entries)
}

/// One page of `user_id`'s saved posts, most recently saved first.
pub fn saved_page(
    conn: &Connection,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT
            p.id, p.author_id, p.text, p.photo, p.is_edited,
            p.created_at, p.updated_at,
            p.comments_count, p.likes_count, p.saves_count,
            u.email, pr.full_name, pr.photo,
            EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1),
            EXISTS(SELECT 1 FROM saved_posts s2 WHERE s2.post_id = p.id AND s2.user_id = ?1),
            EXISTS(SELECT 1 FROM comments c WHERE c.post_id = p.id AND c.author_id = ?1)
        FROM saved_posts s
        JOIN posts p ON p.id = s.post_id
        JOIN users u ON u.id = p.author_id
        LEFT JOIN profiles pr ON pr.user_id = p.author_id
        WHERE s.user_id = ?1
        ORDER BY s.created_at DESC, s.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )?;

    let mut rows = stmt.query(params![user_id, limit, offset])?;
    let mut posts = Vec::new();
    while let Some(row) = rows.next()? {
        posts.push(row_to_post_view(row)?);
    }

    Ok(posts)
}

pub fn count_saved(conn: &Connection, user_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM saved_posts WHERE user_id = ?",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
