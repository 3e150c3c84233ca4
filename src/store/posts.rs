// SPDX-License-Identifier: MPL-2.0

//! Row-level helpers for posts.
//!
//! The `*_view` queries join the author's account and profile and compute
//! the viewer's own flags (liked/saved/commented) with EXISTS subqueries,
//! so a page of posts is a single statement.

use crate::types::{Post, PostOverview, PostView};
use rusqlite::{Connection, params};

use crate::store::StoreError;

/// Denormalized counters on a post row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Comments,
    Likes,
    Saves,
}

impl PostCounter {
    fn column(self) -> &'static str {
        match self {
            PostCounter::Comments => "comments_count",
            PostCounter::Likes => "likes_count",
            PostCounter::Saves => "saves_count",
        }
    }
}

pub fn insert_post(
    conn: &Connection,
    author_id: i64,
    text: &str,
    photo: Option<&str>,
    now: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        r#"
        INSERT INTO posts (author_id, text, photo, is_edited, created_at, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4, ?4)
        "#,
        params![author_id, text, photo, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Replace a post's content, marking it edited.
pub fn update_post(
    conn: &Connection,
    post_id: i64,
    text: &str,
    photo: Option<&str>,
    now: &str,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        r#"
        UPDATE posts
        SET text = ?1, photo = ?2, is_edited = 1, updated_at = ?3
        WHERE id = ?4
        "#,
        params![text, photo, now, post_id],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Delete a post; comments, likes, and saves go with it by cascade.
/// Returns whether a row was deleted.
pub fn delete_post(conn: &Connection, post_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM posts WHERE id = ?", [post_id])?;
    Ok(changed == 1)
}

pub fn get_post(conn: &Connection, post_id: i64) -> Result<Post, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, author_id, text, photo, is_edited, created_at, updated_at,
               comments_count, likes_count, saves_count
        FROM posts
        WHERE id = ?
        "#,
    )?;

    let post = stmt.query_row([post_id], row_to_post).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Database(other),
    })?;

    Ok(post)
}

/// Get a post with author card and the viewer's flags
pub fn get_post_view(conn: &Connection, viewer: i64, post_id: i64) -> Result<PostView, StoreError> {
    let mut stmt = conn.prepare(&format!(
        r#"
        {POST_VIEW_SELECT}
        WHERE p.id = ?2
        "#
    ))?;

    let view = stmt
        .query_row(params![viewer, post_id], row_to_post_view)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })?;

    Ok(view)
}

/// One page of the global feed, newest first
pub fn feed_page(
    conn: &Connection,
    viewer: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        r#"
        {POST_VIEW_SELECT}
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?2 OFFSET ?3
        "#
    ))?;

    let mut rows = stmt.query(params![viewer, limit, offset])?;
    let mut posts = Vec::new();
    while let Some(row) = rows.next()? {
        posts.push(row_to_post_view(row)?);
    }

    Ok(posts)
}

/// One page of a single author's posts, newest first
pub fn author_page(
    conn: &Connection,
    viewer: i64,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        r#"
        {POST_VIEW_SELECT}
        WHERE p.author_id = ?2
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?3 OFFSET ?4
        "#
    ))?;

    let mut rows = stmt.query(params![viewer, author_id, limit, offset])?;
    let mut posts = Vec::new();
    while let Some(row) = rows.next()? {
        posts.push(row_to_post_view(row)?);
    }

    Ok(posts)
}

pub fn count_posts(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_posts_by_author(conn: &Connection, author_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE author_id = ?",
        [author_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Relative counter update; `delta` is +1 or -1 at every call site.
pub fn bump_post_counter(
    conn: &Connection,
    post_id: i64,
    counter: PostCounter,
    delta: i64,
) -> Result<(), StoreError> {
    let sql = format!(
        "UPDATE posts SET {col} = {col} + ?1 WHERE id = ?2",
        col = counter.column()
    );
    conn.execute(&sql, params![delta, post_id])?;
    Ok(())
}

/// Compact card for one post (dashboard rows, notification targets).
/// Comment count is live; likes come from the counter.
pub fn get_post_overview(conn: &Connection, post_id: i64) -> Result<PostOverview, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT p.id, p.text, p.photo, p.created_at, p.author_id,
               u.email, pr.full_name, pr.photo,
               (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
               p.likes_count
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN profiles pr ON pr.user_id = p.author_id
        WHERE p.id = ?
        "#,
    )?;

    let overview = stmt
        .query_row([post_id], row_to_post_overview)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })?;

    Ok(overview)
}

// Shared SELECT for post views: ?1 is always the viewer.
const POST_VIEW_SELECT: &str = r#"
        SELECT
            p.id, p.author_id, p.text, p.photo, p.is_edited,
            p.created_at, p.updated_at,
            p.comments_count, p.likes_count, p.saves_count,
            u.email, pr.full_name, pr.photo,
            EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1),
            EXISTS(SELECT 1 FROM saved_posts s WHERE s.post_id = p.id AND s.user_id = ?1),
            EXISTS(SELECT 1 FROM comments c WHERE c.post_id = p.id AND c.author_id = ?1)
        FROM posts p
        JOIN users u ON u.id = p.author_id
        LEFT JOIN profiles pr ON pr.user_id = p.author_id
"#;

fn row_to_post(row: &rusqlite::Row) -> Result<Post, rusqlite::Error> {
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        text: row.get(2)?,
        photo: row.get(3)?,
        is_edited: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        comments_count: row.get(7)?,
        likes_count: row.get(8)?,
        saves_count: row.get(9)?,
    })
}

/// Convert a POST_VIEW_SELECT row to a PostView
pub(crate) fn row_to_post_view(row: &rusqlite::Row) -> Result<PostView, rusqlite::Error> {
    let email: String = row.get(10)?;
    let full_name: Option<String> = row.get(11)?;
    let author_name = display_name(full_name.as_deref(), &email);

    Ok(PostView {
        post: row_to_post(row)?,
        author_name,
        author_email: email,
        author_photo: row.get(12)?,
        is_liked: row.get::<_, i32>(13)? != 0,
        is_saved: row.get::<_, i32>(14)? != 0,
        is_commented: row.get::<_, i32>(15)? != 0,
    })
}

pub(crate) fn row_to_post_overview(row: &rusqlite::Row) -> Result<PostOverview, rusqlite::Error> {
    let email: String = row.get(5)?;
    let full_name: Option<String> = row.get(6)?;
    let author_name = display_name(full_name.as_deref(), &email);

    Ok(PostOverview {
        id: row.get(0)?,
        text: row.get(1)?,
        photo: row.get(2)?,
        created_at: row.get(3)?,
        author_id: row.get(4)?,
        author_name,
        author_photo: row.get(7)?,
        comments_count: row.get(8)?,
        likes_count: row.get(9)?,
    })
}

/// Full name when set, else the email.
pub(crate) fn display_name(full_name: Option<&str>, email: &str) -> String {
    match full_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.to_string(),
    }
}
