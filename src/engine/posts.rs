// SPDX-License-Identifier: MPL-2.0

use crate::config::{COMMENTS_PAGE_SIZE, FEED_PAGE_SIZE};
use crate::engine::{Engine, EngineError, not_found};
use crate::excerpt::excerpt;
use crate::store::posts::PostCounter;
use crate::store::users::ProfileCounter;
use crate::store::{SocialDb, comments, notifications, posts, users};
use crate::types::{
    Comment, CommentView, NotificationPayload, Page, Post, PostDraft, PostView, clamp_page,
    total_pages,
};

impl Engine {
    /// Publish a post and bump the author's post counter in one transaction.
    ///
    /// A draft needs text, a photo, or both; whitespace-only text counts as
    /// empty. Stored text is trimmed.
    pub fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post, EngineError> {
        if draft.is_empty() {
            return Err(EngineError::Validation(
                "post must have text, a photo, or both".to_string(),
            ));
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        if !users::user_exists(&tx, author_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let now = SocialDb::now();
        let post_id = posts::insert_post(
            &tx,
            author_id,
            draft.text.trim(),
            draft.photo.as_deref(),
            &now,
        )?;
        users::bump_profile_counter(&tx, author_id, ProfileCounter::Posts, 1)?;
        let post = posts::get_post(&tx, post_id)?;

        tx.commit()?;
        Ok(post)
    }

    /// Replace a post's content. Only the author may edit.
    pub fn edit_post(
        &self,
        actor_id: i64,
        post_id: i64,
        draft: &PostDraft,
    ) -> Result<Post, EngineError> {
        if draft.is_empty() {
            return Err(EngineError::Validation(
                "post must have text, a photo, or both".to_string(),
            ));
        }

        let conn = self.db.conn();
        let post = posts::get_post(&conn, post_id).map_err(not_found("post"))?;
        if post.author_id != actor_id {
            return Err(EngineError::Forbidden("you can edit only your own post"));
        }

        let now = SocialDb::now();
        posts::update_post(
            &conn,
            post_id,
            draft.text.trim(),
            draft.photo.as_deref(),
            &now,
        )?;
        Ok(posts::get_post(&conn, post_id)?)
    }

    /// Delete a post and bump the author's post counter back down.
    /// Comments, likes, and saves on the post go with it.
    pub fn delete_post(&self, actor_id: i64, post_id: i64) -> Result<(), EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let post = posts::get_post(&tx, post_id).map_err(not_found("post"))?;
        if post.author_id != actor_id {
            return Err(EngineError::Forbidden("you can delete only your own post"));
        }

        posts::delete_post(&tx, post_id)?;
        users::bump_profile_counter(&tx, post.author_id, ProfileCounter::Posts, -1)?;

        tx.commit()?;
        Ok(())
    }

    /// One post with the author card and the viewer's liked/saved/commented flags.
    pub fn get_post(&self, viewer: i64, post_id: i64) -> Result<PostView, EngineError> {
        let conn = self.db.conn();
        posts::get_post_view(&conn, viewer, post_id).map_err(not_found("post"))
    }

    /// The global feed, newest first.
    pub fn feed(&self, viewer: i64, page: i64) -> Result<Page<PostView>, EngineError> {
        let conn = self.db.conn();
        let total_items = posts::count_posts(&conn)?;
        let pages = total_pages(total_items, FEED_PAGE_SIZE);
        let page = clamp_page(page, pages);
        let items = posts::feed_page(&conn, viewer, FEED_PAGE_SIZE, (page - 1) * FEED_PAGE_SIZE)?;

        Ok(Page {
            items,
            page,
            page_size: FEED_PAGE_SIZE,
            total_items,
            total_pages: pages,
        })
    }

    /// One author's posts, newest first.
    pub fn posts_by_author(
        &self,
        viewer: i64,
        author_id: i64,
        page: i64,
    ) -> Result<Page<PostView>, EngineError> {
        let conn = self.db.conn();
        if !users::user_exists(&conn, author_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let total_items = posts::count_posts_by_author(&conn, author_id)?;
        let pages = total_pages(total_items, FEED_PAGE_SIZE);
        let page = clamp_page(page, pages);
        let items = posts::author_page(
            &conn,
            viewer,
            author_id,
            FEED_PAGE_SIZE,
            (page - 1) * FEED_PAGE_SIZE,
        )?;

        Ok(Page {
            items,
            page,
            page_size: FEED_PAGE_SIZE,
            total_items,
            total_pages: pages,
        })
    }

    /// Comment on a post: insert the comment, bump the post's comment
    /// counter, and notify the post's author, all in one transaction.
    ///
    /// Commenting on your own post is fine but produces no notification.
    pub fn add_comment(
        &self,
        actor_id: i64,
        post_id: i64,
        body: &str,
    ) -> Result<Comment, EngineError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(EngineError::Validation("comment cannot be empty".to_string()));
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let post = posts::get_post(&tx, post_id).map_err(not_found("post"))?;
        if !users::user_exists(&tx, actor_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let now = SocialDb::now();
        let comment_id = comments::insert_comment(&tx, post_id, actor_id, body, &now)?;
        posts::bump_post_counter(&tx, post_id, PostCounter::Comments, 1)?;

        if actor_id != post.author_id {
            let payload = NotificationPayload::Commented {
                post_id,
                post_excerpt: excerpt(&post.text),
                comment_excerpt: excerpt(body),
            };
            notifications::insert(&tx, post.author_id, Some(actor_id), &payload, &now)?;
        }

        let comment = comments::get_comment(&tx, comment_id)?;
        tx.commit()?;
        Ok(comment)
    }

    /// Rewrite a comment's body. Only its author may edit.
    pub fn edit_comment(
        &self,
        actor_id: i64,
        comment_id: i64,
        body: &str,
    ) -> Result<Comment, EngineError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(EngineError::Validation("comment cannot be empty".to_string()));
        }

        let conn = self.db.conn();
        let comment = comments::get_comment(&conn, comment_id).map_err(not_found("comment"))?;
        if comment.author_id != actor_id {
            return Err(EngineError::Forbidden(
                "you can edit only your own comments",
            ));
        }

        comments::update_comment(&conn, comment_id, body, &SocialDb::now())?;
        Ok(comments::get_comment(&conn, comment_id)?)
    }

    /// Remove a comment and bump the post's comment counter back down.
    pub fn delete_comment(&self, actor_id: i64, comment_id: i64) -> Result<(), EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let comment = comments::get_comment(&tx, comment_id).map_err(not_found("comment"))?;
        if comment.author_id != actor_id {
            return Err(EngineError::Forbidden(
                "you can delete only your own comments",
            ));
        }

        comments::delete_comment(&tx, comment_id)?;
        posts::bump_post_counter(&tx, comment.post_id, PostCounter::Comments, -1)?;

        tx.commit()?;
        Ok(())
    }

    /// A post's comments, newest first.
    pub fn comments_for_post(
        &self,
        viewer: i64,
        post_id: i64,
        page: i64,
    ) -> Result<Page<CommentView>, EngineError> {
        let conn = self.db.conn();
        posts::get_post(&conn, post_id).map_err(not_found("post"))?;

        let total_items = comments::count_comments_for_post(&conn, post_id)?;
        let pages = total_pages(total_items, COMMENTS_PAGE_SIZE);
        let page = clamp_page(page, pages);
        let items = comments::comments_page(
            &conn,
            viewer,
            post_id,
            COMMENTS_PAGE_SIZE,
            (page - 1) * COMMENTS_PAGE_SIZE,
        )?;

        Ok(Page {
            items,
            page,
            page_size: COMMENTS_PAGE_SIZE,
            total_items,
            total_pages: pages,
        })
    }
}
