// SPDX-License-Identifier: MPL-2.0

use crate::engine::{Engine, EngineError, not_found};
use crate::store::{SocialDb, users};
use crate::types::{Profile, ProfileUpdate, User};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

// Shape check only; deliverability is not this crate's problem.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Trimmed and lowercased, the canonical stored form.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Engine {
    /// Create an account: validate and normalize the email, insert the user,
    /// provision the profile, and write the registration audit row, all in
    /// one transaction.
    ///
    /// Duplicate emails are rejected case-insensitively ([`EngineError::EmailTaken`]).
    pub fn create_user(&self, email: &str, is_staff: bool) -> Result<User, EngineError> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Err(EngineError::Validation(format!(
                "invalid email address: {email}"
            )));
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        if users::email_exists(&tx, &email)? {
            return Err(EngineError::EmailTaken);
        }

        let now = SocialDb::now();
        let user_id = users::insert_user(&tx, &email, is_staff, &now)?;
        users::insert_profile_if_absent(&tx, user_id)?;
        users::insert_registration(&tx, user_id, "signup", &now)?;

        tx.commit()?;

        info!(user_id, email = %email, "account created");

        Ok(User {
            id: user_id,
            email,
            is_staff,
            is_active: true,
            date_joined: now,
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<User, EngineError> {
        let conn = self.db.conn();
        users::get_user(&conn, user_id).map_err(not_found("user"))
    }

    pub fn get_profile(&self, user_id: i64) -> Result<Profile, EngineError> {
        let conn = self.db.conn();
        users::get_profile(&conn, user_id).map_err(not_found("profile"))
    }

    /// Replace the editable profile fields; counters stay as they are.
    pub fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<Profile, EngineError> {
        let conn = self.db.conn();
        users::update_profile(&conn, user_id, update).map_err(not_found("profile"))?;
        users::get_profile(&conn, user_id).map_err(not_found("profile"))
    }

    /// Delete an account and everything it owns.
    ///
    /// Cascades remove the user's rows; before they fire, the counters that
    /// those rows back on *other* users' data are walked back: peers'
    /// follower/following tallies and the like/save/comment counts on posts
    /// the user interacted with.
    pub fn delete_user(&self, user_id: i64) -> Result<(), EngineError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        users::get_user(&tx, user_id).map_err(not_found("user"))?;

        // People this user follows lose a follower
        tx.execute(
            r#"
            UPDATE profiles SET followers_count = followers_count - 1
            WHERE user_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)
            "#,
            [user_id],
        )?;
        // People following this user lose a following entry
        tx.execute(
            r#"
            UPDATE profiles SET following_count = following_count - 1
            WHERE user_id IN (SELECT follower_id FROM follows WHERE following_id = ?1)
            "#,
            [user_id],
        )?;

        // Likes and saves are unique per (user, post), so minus one each.
        // The user's own posts are skipped; they are about to go anyway.
        tx.execute(
            r#"
            UPDATE posts SET likes_count = likes_count - 1
            WHERE author_id <> ?1
              AND id IN (SELECT post_id FROM likes WHERE user_id = ?1)
            "#,
            [user_id],
        )?;
        tx.execute(
            r#"
            UPDATE posts SET saves_count = saves_count - 1
            WHERE author_id <> ?1
              AND id IN (SELECT post_id FROM saved_posts WHERE user_id = ?1)
            "#,
            [user_id],
        )?;
        // A user can comment on the same post more than once
        tx.execute(
            r#"
            UPDATE posts
            SET comments_count = comments_count -
                (SELECT COUNT(*) FROM comments c
                 WHERE c.post_id = posts.id AND c.author_id = ?1)
            WHERE author_id <> ?1
              AND id IN (SELECT post_id FROM comments WHERE author_id = ?1)
            "#,
            [user_id],
        )?;

        users::delete_user(&tx, user_id)?;

        tx.commit()?;

        info!(user_id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SocialDb;
    use crate::types::{AcademicYear, Major, PostDraft};

    fn engine() -> Engine {
        Engine::new(SocialDb::open_in_memory().unwrap())
    }

    #[test]
    fn test_create_user_normalizes_email() {
        let e = engine();
        let user = e.create_user("  Moe.Thu@UNI.Edu ", false).unwrap();
        assert_eq!(user.email, "moe.thu@uni.edu");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.date_joined.is_empty());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let e = engine();
        for bad in ["", "not-an-email", "a@b", "two words@uni.edu", "@uni.edu"] {
            match e.create_user(bad, false) {
                Err(EngineError::Validation(_)) => {}
                other => panic!("expected Validation for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_email_rejected_case_insensitive() {
        let e = engine();
        e.create_user("aye@uni.edu", false).unwrap();
        match e.create_user("  AYE@Uni.Edu", false) {
            Err(EngineError::EmailTaken) => {}
            other => panic!("expected EmailTaken, got {other:?}"),
        }
    }

    #[test]
    fn test_profile_provisioned_with_zero_counters() {
        let e = engine();
        let user = e.create_user("new@uni.edu", false).unwrap();
        let profile = e.get_profile(user.id).unwrap();
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.posts_count, 0);
        assert_eq!(profile.followers_count, 0);
        assert_eq!(profile.following_count, 0);
        assert_eq!(profile.full_name, "");
        assert!(profile.major.is_none());
    }

    #[test]
    fn test_registration_logged() {
        let e = engine();
        let user = e.create_user("log@uni.edu", false).unwrap();
        let conn = e.db().conn();
        let (count, source): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(source) FROM registration_log WHERE user_id = ?",
                [user.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(source, "signup");
    }

    #[test]
    fn test_get_user_not_found() {
        let e = engine();
        match e.get_user(42) {
            Err(EngineError::NotFound("user")) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_update_profile_round_trip() {
        let e = engine();
        let user = e.create_user("edit@uni.edu", false).unwrap();

        let update = ProfileUpdate {
            full_name: "Aye Chan".to_string(),
            bio: "hello".to_string(),
            major: Some(Major::Cs),
            year: Some(AcademicYear::Third),
            roll_no: Some("CS-042".to_string()),
            photo: None,
            phone_no: None,
        };
        let profile = e.update_profile(user.id, &update).unwrap();
        assert_eq!(profile.full_name, "Aye Chan");
        assert_eq!(profile.major, Some(Major::Cs));
        assert_eq!(profile.year, Some(AcademicYear::Third));
        assert_eq!(profile.display_name(&user.email), "Aye Chan");

        match e.update_profile(999, &update) {
            Err(EngineError::NotFound("profile")) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_user_walks_back_peer_counters() {
        let e = engine();
        let a = e.create_user("a@uni.edu", false).unwrap();
        let b = e.create_user("b@uni.edu", false).unwrap();
        let c = e.create_user("c@uni.edu", false).unwrap();

        // A follows B and C; C follows A
        assert!(e.toggle_follow(a.id, b.id).unwrap());
        assert!(e.toggle_follow(a.id, c.id).unwrap());
        assert!(e.toggle_follow(c.id, a.id).unwrap());

        // A likes, saves, and comments twice on B's post
        let post = e
            .create_post(
                b.id,
                &PostDraft {
                    text: "b's post".to_string(),
                    photo: None,
                },
            )
            .unwrap();
        e.toggle_like(a.id, post.id).unwrap();
        e.toggle_save(a.id, post.id).unwrap();
        e.add_comment(a.id, post.id, "first").unwrap();
        e.add_comment(a.id, post.id, "second").unwrap();

        e.delete_user(a.id).unwrap();

        let b_profile = e.get_profile(b.id).unwrap();
        assert_eq!(b_profile.followers_count, 0);
        let c_profile = e.get_profile(c.id).unwrap();
        assert_eq!(c_profile.followers_count, 0);
        assert_eq!(c_profile.following_count, 0);

        let post = e.get_post(b.id, post.id).unwrap().post;
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.saves_count, 0);
        assert_eq!(post.comments_count, 0);

        // Nothing left to repair
        let drift = e.reconcile_counters().unwrap();
        assert!(drift.is_clean(), "unexpected drift: {drift:?}");
    }

    #[test]
    fn test_delete_missing_user() {
        let e = engine();
        match e.delete_user(7) {
            Err(EngineError::NotFound("user")) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
