// SPDX-License-Identifier: MPL-2.0

//! Aggregates behind the staff dashboard.
//!
//! Like totals read the denormalized counters; comment totals count live
//! rows. The asymmetry is deliberate: it keeps counter drift visible on the
//! dashboard instead of papering over it.

use crate::engine::{Engine, EngineError};
use crate::store::posts::{display_name, row_to_post_overview};
use crate::types::{Page, PostOverview, UserOverview, clamp_page, total_pages};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UsersSummary {
    pub total_users: i64,
    pub total_posts: i64,
    pub latest_user: Option<LatestUser>,
    pub latest_post: Option<LatestPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestUser {
    pub id: i64,
    pub email: String,
    pub date_joined: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestPost {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub author_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostsSummary {
    pub total_posts: i64,
    pub latest_post: Option<LatestPost>,
    pub top_author: Option<TopAuthor>,
}

/// Most prolific account by live post count. Present whenever any account
/// exists, even with zero posts.
#[derive(Debug, Clone, Serialize)]
pub struct TopAuthor {
    pub id: i64,
    pub email: String,
    pub num_posts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikesSummary {
    /// Sum of the posts' `likes_count` counters.
    pub total_likes: i64,
    pub top_post: Option<TopPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsSummary {
    /// Live count of comment rows.
    pub total_comments: i64,
    pub top_post: Option<TopPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPost {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub author_id: i64,
    pub count: i64,
}

impl Engine {
    pub fn users_summary(&self) -> Result<UsersSummary, EngineError> {
        let conn = self.db.conn();
        let total_users = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let total_posts = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        let latest_user = conn
            .query_row(
                "SELECT id, email, date_joined FROM users ORDER BY date_joined DESC, id DESC LIMIT 1",
                [],
                |row| {
                    Ok(LatestUser {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        date_joined: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(UsersSummary {
            total_users,
            total_posts,
            latest_user,
            latest_post: latest_post(&conn)?,
        })
    }

    pub fn posts_summary(&self) -> Result<PostsSummary, EngineError> {
        let conn = self.db.conn();
        let total_posts = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

        let top_author = conn
            .query_row(
                r#"
                SELECT u.id, u.email, COUNT(p.id) AS n
                FROM users u
                LEFT JOIN posts p ON p.author_id = u.id
                GROUP BY u.id
                ORDER BY n DESC, u.id ASC
                LIMIT 1
                "#,
                [],
                |row| {
                    Ok(TopAuthor {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        num_posts: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(PostsSummary {
            total_posts,
            latest_post: latest_post(&conn)?,
            top_author,
        })
    }

    pub fn likes_summary(&self) -> Result<LikesSummary, EngineError> {
        let conn = self.db.conn();
        let total_likes = conn.query_row(
            "SELECT COALESCE(SUM(likes_count), 0) FROM posts",
            [],
            |row| row.get(0),
        )?;

        let top_post = conn
            .query_row(
                r#"
                SELECT id, text, created_at, author_id, likes_count
                FROM posts
                ORDER BY likes_count DESC, id ASC
                LIMIT 1
                "#,
                [],
                row_to_top_post,
            )
            .optional()?;

        Ok(LikesSummary {
            total_likes,
            top_post,
        })
    }

    pub fn comments_summary(&self) -> Result<CommentsSummary, EngineError> {
        let conn = self.db.conn();
        let total_comments =
            conn.query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))?;

        let top_post = conn
            .query_row(
                r#"
                SELECT p.id, p.text, p.created_at, p.author_id, COUNT(c.id) AS n
                FROM posts p
                LEFT JOIN comments c ON c.post_id = p.id
                GROUP BY p.id
                ORDER BY n DESC, p.id ASC
                LIMIT 1
                "#,
                [],
                row_to_top_post,
            )
            .optional()?;

        Ok(CommentsSummary {
            total_comments,
            top_post,
        })
    }

    /// The dashboard's account table, newest signup first.
    pub fn users_overview(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Page<UserOverview>, EngineError> {
        let page_size = page_size.max(1);
        let conn = self.db.conn();
        let total_items = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let pages = total_pages(total_items, page_size);
        let page = clamp_page(page, pages);

        let mut stmt = conn.prepare(
            r#"
            SELECT u.id, pr.full_name, u.email, u.date_joined, pr.photo
            FROM users u
            LEFT JOIN profiles pr ON pr.user_id = u.id
            ORDER BY u.date_joined DESC, u.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let mut rows = stmt.query(params![page_size, (page - 1) * page_size])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let full_name: Option<String> = row.get(1)?;
            let email: String = row.get(2)?;
            items.push(UserOverview {
                id: row.get(0)?,
                name: display_name(full_name.as_deref(), &email),
                email,
                date_joined: row.get(3)?,
                photo: row.get(4)?,
            });
        }

        Ok(Page {
            items,
            page,
            page_size,
            total_items,
            total_pages: pages,
        })
    }

    /// The dashboard's post table, newest first, with live comment counts.
    pub fn posts_overview(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<Page<PostOverview>, EngineError> {
        let page_size = page_size.max(1);
        let conn = self.db.conn();
        let total_items = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        let pages = total_pages(total_items, page_size);
        let page = clamp_page(page, pages);

        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.text, p.photo, p.created_at, p.author_id,
                   u.email, pr.full_name, pr.photo,
                   (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
                   p.likes_count
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN profiles pr ON pr.user_id = p.author_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )?;
        let mut rows = stmt.query(params![page_size, (page - 1) * page_size])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(row_to_post_overview(row)?);
        }

        Ok(Page {
            items,
            page,
            page_size,
            total_items,
            total_pages: pages,
        })
    }
}

fn latest_post(conn: &Connection) -> Result<Option<LatestPost>, EngineError> {
    let latest = conn
        .query_row(
            "SELECT id, text, created_at, author_id FROM posts ORDER BY created_at DESC, id DESC LIMIT 1",
            [],
            |row| {
                Ok(LatestPost {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    created_at: row.get(2)?,
                    author_id: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(latest)
}

fn row_to_top_post(row: &rusqlite::Row) -> Result<TopPost, rusqlite::Error> {
    Ok(TopPost {
        id: row.get(0)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
        author_id: row.get(3)?,
        count: row.get(4)?,
    })
}
