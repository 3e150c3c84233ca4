// SPDX-License-Identifier: MPL-2.0

use crate::engine::{Engine, EngineError};
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

/// How many rows each counter repair touched. All zero means the
/// denormalized counters already matched their source rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterDrift {
    pub post_likes: usize,
    pub post_comments: usize,
    pub post_saves: usize,
    pub profile_posts: usize,
    pub profile_followers: usize,
    pub profile_following: usize,
}

impl CounterDrift {
    pub fn total(&self) -> usize {
        self.post_likes
            + self.post_comments
            + self.post_saves
            + self.profile_posts
            + self.profile_followers
            + self.profile_following
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl Engine {
    /// Recompute every denormalized counter from its source-of-truth rows.
    ///
    /// Runs as one transaction and only rewrites rows whose counter is
    /// actually wrong, so a clean database is a cheap no-op. Returns the
    /// per-counter repair tally and logs a warning when anything drifted.
    pub fn reconcile_counters(&self) -> Result<CounterDrift, EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let drift = CounterDrift {
            post_likes: repair(
                &tx,
                "UPDATE posts SET likes_count =
                     (SELECT COUNT(*) FROM likes l WHERE l.post_id = posts.id)
                 WHERE likes_count <>
                     (SELECT COUNT(*) FROM likes l WHERE l.post_id = posts.id)",
            )?,
            post_comments: repair(
                &tx,
                "UPDATE posts SET comments_count =
                     (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id)
                 WHERE comments_count <>
                     (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id)",
            )?,
            post_saves: repair(
                &tx,
                "UPDATE posts SET saves_count =
                     (SELECT COUNT(*) FROM saved_posts s WHERE s.post_id = posts.id)
                 WHERE saves_count <>
                     (SELECT COUNT(*) FROM saved_posts s WHERE s.post_id = posts.id)",
            )?,
            profile_posts: repair(
                &tx,
                "UPDATE profiles SET posts_count =
                     (SELECT COUNT(*) FROM posts p WHERE p.author_id = profiles.user_id)
                 WHERE posts_count <>
                     (SELECT COUNT(*) FROM posts p WHERE p.author_id = profiles.user_id)",
            )?,
            profile_followers: repair(
                &tx,
                "UPDATE profiles SET followers_count =
                     (SELECT COUNT(*) FROM follows f WHERE f.following_id = profiles.user_id)
                 WHERE followers_count <>
                     (SELECT COUNT(*) FROM follows f WHERE f.following_id = profiles.user_id)",
            )?,
            profile_following: repair(
                &tx,
                "UPDATE profiles SET following_count =
                     (SELECT COUNT(*) FROM follows f WHERE f.follower_id = profiles.user_id)
                 WHERE following_count <>
                     (SELECT COUNT(*) FROM follows f WHERE f.follower_id = profiles.user_id)",
            )?,
        };

        tx.commit()?;

        if !drift.is_clean() {
            warn!(repaired = drift.total(), ?drift, "counter drift repaired");
        }
        Ok(drift)
    }
}

fn repair(conn: &Connection, sql: &str) -> Result<usize, EngineError> {
    Ok(conn.execute(sql, [])?)
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
    fn test_clean_database_reports_zero() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");
        let p = post(&e, a.id, "hello");
        e.toggle_like(b.id, p.id).unwrap();
        e.toggle_save(b.id, p.id).unwrap();
        e.add_comment(b.id, p.id, "hi").unwrap();
        e.toggle_follow(b.id, a.id).unwrap();

        let drift = e.reconcile_counters().unwrap();
        assert!(drift.is_clean(), "unexpected drift: {drift:?}");
    }

    #[test]
    fn test_manufactured_drift_is_repaired() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");
        let p = post(&e, a.id, "drift me");
        e.toggle_like(b.id, p.id).unwrap();
        e.toggle_follow(b.id, a.id).unwrap();

        {
            let conn = e.db().conn();
            conn.execute("UPDATE posts SET likes_count = 7 WHERE id = ?", [p.id])
                .unwrap();
            conn.execute(
                "UPDATE profiles SET followers_count = 3 WHERE user_id = ?",
                [a.id],
            )
            .unwrap();
        }

        let drift = e.reconcile_counters().unwrap();
        assert_eq!(
            drift,
            CounterDrift {
                post_likes: 1,
                profile_followers: 1,
                ..CounterDrift::default()
            }
        );

        assert_eq!(e.get_post(a.id, p.id).unwrap().post.likes_count, 1);
        assert_eq!(e.get_profile(a.id).unwrap().followers_count, 1);

        // A second pass finds nothing left to fix
        assert!(e.reconcile_counters().unwrap().is_clean());
    }

    #[test]
    fn test_each_counter_is_covered() {
        let e = engine();
        let a = user(&e, "a@uni.edu");
        let b = user(&e, "b@uni.edu");
        let p = post(&e, a.id, "cover all");
        e.toggle_like(b.id, p.id).unwrap();
        e.toggle_save(b.id, p.id).unwrap();
        e.add_comment(b.id, p.id, "row").unwrap();
        e.toggle_follow(a.id, b.id).unwrap();

        {
            let conn = e.db().conn();
            conn.execute(
                "UPDATE posts SET likes_count = 9, comments_count = 9, saves_count = 9",
                [],
            )
            .unwrap();
            conn.execute(
                "UPDATE profiles SET posts_count = 9, followers_count = 9, following_count = 9",
                [],
            )
            .unwrap();
        }

        let drift = e.reconcile_counters().unwrap();
        assert_eq!(drift.post_likes, 1);
        assert_eq!(drift.post_comments, 1);
        assert_eq!(drift.post_saves, 1);
        // Both profiles had a wrong posts_count (a's real count is 1, b's is 0)
        assert_eq!(drift.profile_posts, 2);
        assert_eq!(drift.profile_followers, 2);
        assert_eq!(drift.profile_following, 2);
        assert_eq!(drift.total(), 9);

        let post = e.get_post(a.id, p.id).unwrap().post;
        assert_eq!(post.likes_count, 1);
        assert_eq!(post.comments_count, 1);
        assert_eq!(post.saves_count, 1);
        let a_profile = e.get_profile(a.id).unwrap();
        assert_eq!(a_profile.posts_count, 1);
        assert_eq!(a_profile.followers_count, 0);
        assert_eq!(a_profile.following_count, 1);
    }
}
