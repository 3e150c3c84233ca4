// SPDX-License-Identifier: MPL-2.0

use crate::types::{Comment, CommentView};
use rusqlite::{Connection, params};

use crate::store::StoreError;
use crate::store::posts::display_name;

pub fn insert_comment(
    conn: &Connection,
    post_id: i64,
    author_id: i64,
    body: &str,
    now: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        r#"
        INSERT INTO comments (author_id, post_id, body, is_edited, created_at, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4, ?4)
        "#,
        params![author_id, post_id, body, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_comment(conn: &Connection, comment_id: i64) -> Result<Comment, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, post_id, author_id, body, is_edited, created_at, updated_at
        FROM comments
        WHERE id = ?
        "#,
    )?;

    let comment = stmt
        .query_row([comment_id], row_to_comment)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })?;

    Ok(comment)
}

/// Replace a comment's body, marking it edited.
pub fn update_comment(
    conn: &Connection,
    comment_id: i64,
    body: &str,
    now: &str,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE comments SET body = ?1, is_edited = 1, updated_at = ?2 WHERE id = ?3",
        params![body, now, comment_id],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Returns whether a row was deleted.
pub fn delete_comment(conn: &Connection, comment_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM comments WHERE id = ?", [comment_id])?;
    Ok(changed == 1)
}

/// One page of a post's comments, newest first, with author cards.
pub fn comments_page(
    conn: &Connection,
    viewer: i64,
    post_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentView>, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.body, c.is_edited,
               c.created_at, c.updated_at,
               u.email, pr.full_name, pr.photo
        FROM comments c
        JOIN users u ON u.id = c.author_id
        LEFT JOIN profiles pr ON pr.user_id = c.author_id
        WHERE c.post_id = ?1
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT ?2 OFFSET ?3
        "#,
    )?;

    let mut rows = stmt.query(params![post_id, limit, offset])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        let comment = row_to_comment(row)?;
        let email: String = row.get(7)?;
        let full_name: Option<String> = row.get(8)?;
        let author_name = display_name(full_name.as_deref(), &email);
        let is_owner = comment.author_id == viewer;

        comments.push(CommentView {
            comment,
            author_name,
            author_email: email,
            author_photo: row.get(9)?,
            is_owner,
        });
    }

    Ok(comments)
}

pub fn count_comments_for_post(conn: &Connection, post_id: i64) -> Result<i64, StoreError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?",
        [post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_comment(row: &rusqlite::Row) -> Result<Comment, rusqlite::Error> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author_id: row.get(2)?,
        body: row.get(3)?,
        is_edited: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
