// SPDX-License-Identifier: MPL-2.0

//! Like, save, and follow toggles.
//!
//! Each toggle is one transaction: flip the row, move the counters, and on
//! the creation branch only, fan a notification out to the affected user.
//! The unique constraints on (user, post) and (follower, following) make a
//! racing duplicate insert a no-op instead of an error, so double-toggling
//! can never double-count or double-notify.

use crate::config::FEED_PAGE_SIZE;
use crate::engine::{Engine, EngineError, not_found};
use crate::excerpt::excerpt;
use crate::store::posts::PostCounter;
use crate::store::users::ProfileCounter;
use crate::store::{SocialDb, notifications, posts, social, users};
use crate::types::{FollowEntry, NotificationPayload, Page, PostView, clamp_page, total_pages};

/// Outcome of a like toggle: the new state plus the post's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: i64,
}

/// Outcome of a save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveToggle {
    pub saved: bool,
    pub saves_count: i64,
}

impl Engine {
    /// Like a post, or take the like back if it is already there.
    ///
    /// Liking notifies the post's author unless the actor is the author.
    /// Unliking never notifies.
    pub fn toggle_like(&self, actor_id: i64, post_id: i64) -> Result<LikeToggle, EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let post = posts::get_post(&tx, post_id).map_err(not_found("post"))?;
        if !users::user_exists(&tx, actor_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let now = SocialDb::now();
        let liked = if social::insert_like_if_absent(&tx, actor_id, post_id, &now)? {
            posts::bump_post_counter(&tx, post_id, PostCounter::Likes, 1)?;
            if actor_id != post.author_id {
                let payload = NotificationPayload::PostLiked {
                    post_id,
                    post_excerpt: excerpt(&post.text),
                };
                notifications::insert(&tx, post.author_id, Some(actor_id), &payload, &now)?;
            }
            true
        } else {
            if social::delete_like(&tx, actor_id, post_id)? {
                posts::bump_post_counter(&tx, post_id, PostCounter::Likes, -1)?;
            }
            false
        };

        let likes_count = posts::get_post(&tx, post_id)?.likes_count;
        tx.commit()?;

        Ok(LikeToggle { liked, likes_count })
    }

    /// Bookmark a post, or drop the bookmark. Saves are private: no
    /// notification either way.
    pub fn toggle_save(&self, actor_id: i64, post_id: i64) -> Result<SaveToggle, EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        posts::get_post(&tx, post_id).map_err(not_found("post"))?;
        if !users::user_exists(&tx, actor_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let saved = if social::insert_save_if_absent(&tx, actor_id, post_id, &SocialDb::now())? {
            posts::bump_post_counter(&tx, post_id, PostCounter::Saves, 1)?;
            true
        } else {
            if social::delete_save(&tx, actor_id, post_id)? {
                posts::bump_post_counter(&tx, post_id, PostCounter::Saves, -1)?;
            }
            false
        };

        let saves_count = posts::get_post(&tx, post_id)?.saves_count;
        tx.commit()?;

        Ok(SaveToggle { saved, saves_count })
    }

    /// Follow a user, or unfollow if already following. Returns the new
    /// state: true when the relationship now exists.
    ///
    /// Self-follow is rejected before anything is written. Both counters of
    /// the pair move in the same transaction, so `following_count` and the
    /// target's `followers_count` can never drift apart.
    pub fn toggle_follow(&self, actor_id: i64, target_id: i64) -> Result<bool, EngineError> {
        if actor_id == target_id {
            return Err(EngineError::SelfFollow);
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        if !users::user_exists(&tx, target_id)? {
            return Err(EngineError::NotFound("user"));
        }
        if !users::user_exists(&tx, actor_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let now = SocialDb::now();
        let following = if social::insert_follow_if_absent(&tx, actor_id, target_id, &now)? {
            users::bump_profile_counter(&tx, actor_id, ProfileCounter::Following, 1)?;
            users::bump_profile_counter(&tx, target_id, ProfileCounter::Followers, 1)?;
            notifications::insert(
                &tx,
                target_id,
                Some(actor_id),
                &NotificationPayload::Followed,
                &now,
            )?;
            true
        } else {
            if social::delete_follow(&tx, actor_id, target_id)? {
                users::bump_profile_counter(&tx, actor_id, ProfileCounter::Following, -1)?;
                users::bump_profile_counter(&tx, target_id, ProfileCounter::Followers, -1)?;
            }
            false
        };

        tx.commit()?;
        Ok(following)
    }

    pub fn is_following(&self, follower_id: i64, following_id: i64) -> Result<bool, EngineError> {
        let conn = self.db.conn();
        Ok(social::is_following(&conn, follower_id, following_id)?)
    }

    /// Who follows `target`, newest follow first, with a flag per entry for
    /// whether the viewer follows that person.
    pub fn followers(&self, viewer: i64, target_id: i64) -> Result<Vec<FollowEntry>, EngineError> {
        let conn = self.db.conn();
        if !users::user_exists(&conn, target_id)? {
            return Err(EngineError::NotFound("user"));
        }
        Ok(social::followers_of(&conn, viewer, target_id)?)
    }

    /// Who `target` follows, newest follow first.
    pub fn following(&self, viewer: i64, target_id: i64) -> Result<Vec<FollowEntry>, EngineError> {
        let conn = self.db.conn();
        if !users::user_exists(&conn, target_id)? {
            return Err(EngineError::NotFound("user"));
        }
        Ok(social::following_of(&conn, viewer, target_id)?)
    }

    /// The user's saved posts, most recently saved first.
    pub fn saved_posts(&self, user_id: i64, page: i64) -> Result<Page<PostView>, EngineError> {
        let conn = self.db.conn();
        if !users::user_exists(&conn, user_id)? {
            return Err(EngineError::NotFound("user"));
        }

        let total_items = social::count_saved(&conn, user_id)?;
        let pages = total_pages(total_items, FEED_PAGE_SIZE);
        let page = clamp_page(page, pages);
        let items = social::saved_page(&conn, user_id, FEED_PAGE_SIZE, (page - 1) * FEED_PAGE_SIZE)?;

        Ok(Page {
            items,
            page,
            page_size: FEED_PAGE_SIZE,
            total_items,
            total_pages: pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SocialDb;
    use crate::types::{Post, PostDraft, User};

    fn engine() -> Engine {
        Engine::new(SocialDb::open_in_memory().unwrap())
    }

    fn user(e: &Engine, email: &str) -> User {
        e.create_user(email, false).unwrap()
    }

    fn post(e: &Engine, author_id: i64, text: &str) -> Post {
        e.create_post(
            author_id,
            &PostDraft {
                text: text.to_string(),
                photo: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_like_toggle_moves_counter_and_notifies_once() {
        let e = engine();
        let author = user(&e, "author@uni.edu");
        let fan = user(&e, "fan@uni.edu");
        let created = post(&e, author.id, "like me");

        let on = e.toggle_like(fan.id, created.id).unwrap();
        assert!(on.liked);
        assert_eq!(on.likes_count, 1);

        let page = e.notifications(author.id, 1).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].verb(), "liked");
        assert_eq!(page.items[0].actor_id, Some(fan.id));

        let off = e.toggle_like(fan.id, created.id).unwrap();
        assert!(!off.liked);
        assert_eq!(off.likes_count, 0);

        // Unliking does not add a notification
        assert_eq!(e.notifications(author.id, 1).unwrap().total_items, 1);
    }

    #[test]
    fn test_self_like_allowed_but_silent() {
        let e = engine();
        let author = user(&e, "author@uni.edu");
        let created = post(&e, author.id, "self five");

        let on = e.toggle_like(author.id, created.id).unwrap();
        assert!(on.liked);
        assert_eq!(on.likes_count, 1);
        assert_eq!(e.notifications(author.id, 1).unwrap().total_items, 0);
    }

    #[test]
    fn test_like_missing_post() {
        let e = engine();
        let fan = user(&e, "fan@uni.edu");
        match e.toggle_like(fan.id, 999) {
            Err(EngineError::NotFound("post")) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_save_toggle_is_private() {
        let e = engine();
        let author = user(&e, "author@uni.edu");
        let reader = user(&e, "reader@uni.edu");
        let created = post(&e, author.id, "keep this");

        let on = e.toggle_save(reader.id, created.id).unwrap();
        assert!(on.saved);
        assert_eq!(on.saves_count, 1);
        assert_eq!(e.notifications(author.id, 1).unwrap().total_items, 0);

        let off = e.toggle_save(reader.id, created.id).unwrap();
        assert!(!off.saved);
        assert_eq!(off.saves_count, 0);
    }

    #[test]
    fn test_follow_follow_leaves_one_row_and_plus_one() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");

        assert!(e.toggle_follow(a.id, b.id).unwrap());
        // Second toggle flips back off, it does not double up
        assert!(!e.toggle_follow(a.id, b.id).unwrap());
        assert!(e.toggle_follow(a.id, b.id).unwrap());

        assert!(e.is_following(a.id, b.id).unwrap());
        assert_eq!(e.get_profile(a.id).unwrap().following_count, 1);
        assert_eq!(e.get_profile(b.id).unwrap().followers_count, 1);

        let conn = e.db().conn();
        let rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                rusqlite::params![a.id, b.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_follow_notifies_target() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");

        e.toggle_follow(a.id, b.id).unwrap();

        let page = e.notifications(b.id, 1).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].verb(), "started following you");
        assert!(page.items[0].preview().is_none());

        // Unfollow moves counters back and stays silent
        e.toggle_follow(a.id, b.id).unwrap();
        assert_eq!(e.get_profile(b.id).unwrap().followers_count, 0);
        assert_eq!(e.get_profile(a.id).unwrap().following_count, 0);
        assert_eq!(e.notifications(b.id, 1).unwrap().total_items, 1);
    }

    #[test]
    fn test_self_follow_rejected_outright() {
        let e = engine();
        let a = user(&e, "a@uni.edu");

        match e.toggle_follow(a.id, a.id) {
            Err(EngineError::SelfFollow) => {}
            other => panic!("expected SelfFollow, got {other:?}"),
        }

        let profile = e.get_profile(a.id).unwrap();
        assert_eq!(profile.followers_count, 0);
        assert_eq!(profile.following_count, 0);
        assert_eq!(e.notifications(a.id, 1).unwrap().total_items, 0);
    }

    #[test]
    fn test_follow_lists_annotate_viewer() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");
        let c = user(&e, "c@uni.edu");

        e.toggle_follow(b.id, a.id).unwrap();
        e.toggle_follow(c.id, a.id).unwrap();
        e.toggle_follow(a.id, c.id).unwrap();

        let followers = e.followers(a.id, a.id).unwrap();
        assert_eq!(followers.len(), 2);
        // Newest follow first
        assert_eq!(followers[0].user_id, c.id);
        assert!(followers[0].is_following, "viewer follows c");
        assert!(!followers[1].is_following, "viewer does not follow b");

        let following = e.following(a.id, a.id).unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].user_id, c.id);

        match e.followers(a.id, 999) {
            Err(EngineError::NotFound("user")) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_saved_posts_page_most_recent_first() {
        let e = engine();
        let author = user(&e, "author@uni.edu");
        let reader = user(&e, "reader@uni.edu");
        let first = post(&e, author.id, "first");
        let second = post(&e, author.id, "second");

        e.toggle_save(reader.id, first.id).unwrap();
        e.toggle_save(reader.id, second.id).unwrap();

        let page = e.saved_posts(reader.id, 1).unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].post.id, second.id);
        assert!(page.items[0].is_saved);

        // Unsaving shrinks the page
        e.toggle_save(reader.id, second.id).unwrap();
        assert_eq!(e.saved_posts(reader.id, 1).unwrap().total_items, 1);
    }
}
