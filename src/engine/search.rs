// SPDX-License-Identifier: MPL-2.0

use crate::config::{SEARCH_PEOPLE_LIMIT, SEARCH_POSTS_LIMIT};
use crate::engine::{Engine, EngineError};
use crate::store::posts::row_to_post_overview;
use crate::types::PostOverview;
use rusqlite::params;
use serde::Serialize;

/// A person matched by search: raw profile fields, the page shows both
/// name and email.
#[derive(Debug, Clone, Serialize)]
pub struct PersonHit {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub people: Vec<PersonHit>,
    pub posts: Vec<PostOverview>,
}

impl Engine {
    /// Case-insensitive substring search over people and posts.
    ///
    /// People match on full name or email, ordered by name then email.
    /// Posts match on their text or their author's name or email, newest
    /// first. Both lists are capped; a blank query matches nothing.
    pub fn search(&self, query: &str) -> Result<SearchResults, EngineError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }

        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            r#"
            SELECT u.id, pr.full_name, u.email, pr.photo
            FROM users u
            JOIN profiles pr ON pr.user_id = u.id
            WHERE instr(lower(pr.full_name), lower(?1)) > 0
               OR instr(lower(u.email), lower(?1)) > 0
            ORDER BY pr.full_name, u.email
            LIMIT ?2
            "#,
        )?;
        let mut rows = stmt.query(params![query, SEARCH_PEOPLE_LIMIT])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(PersonHit {
                user_id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                photo: row.get(3)?,
            });
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.text, p.photo, p.created_at, p.author_id,
                   u.email, pr.full_name, pr.photo,
                   (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
                   p.likes_count
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN profiles pr ON pr.user_id = p.author_id
            WHERE instr(lower(p.text), lower(?1)) > 0
               OR instr(lower(u.email), lower(?1)) > 0
               OR instr(lower(COALESCE(pr.full_name, '')), lower(?1)) > 0
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?2
            "#,
        )?;
        let mut rows = stmt.query(params![query, SEARCH_POSTS_LIMIT])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(row_to_post_overview(row)?);
        }

        Ok(SearchResults { people, posts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SocialDb;
    use crate::types::{PostDraft, ProfileUpdate, User};

    fn engine() -> Engine {
        Engine::new(SocialDb::open_in_memory().unwrap())
    }

    fn named_user(e: &Engine, email: &str, full_name: &str) -> User {
        let user = e.create_user(email, false).unwrap();
        e.update_profile(
            user.id,
            &ProfileUpdate {
                full_name: full_name.to_string(),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();
        user
    }

    fn post(e: &Engine, author_id: i64, text: &str) {
        e.create_post(
            author_id,
            &PostDraft {
                text: text.to_string(),
                photo: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let e = engine();
        let user = named_user(&e, "someone@uni.edu", "Someone Real");
        post(&e, user.id, "a post that would match anything");

        for q in ["", "   ", "\t\n"] {
            let results = e.search(q).unwrap();
            assert!(results.people.is_empty());
            assert!(results.posts.is_empty());
        }
    }

    #[test]
    fn test_people_match_name_or_email_ordered() {
        let e = engine();
        named_user(&e, "kyaw@uni.edu", "Kyaw Aye");
        named_user(&e, "chan@uni.edu", "Aye Chan");
        named_user(&e, "mya@uni.edu", "Mya Thet");
        // Matches on the email side only
        named_user(&e, "ayethida@uni.edu", "Thida Win");

        let results = e.search("AYE").unwrap();
        let names: Vec<&str> = results.people.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, ["Aye Chan", "Kyaw Aye", "Thida Win"]);
        assert!(results.posts.is_empty());
    }

    #[test]
    fn test_people_capped() {
        let e = engine();
        for i in 0..25 {
            named_user(&e, &format!("match{i:02}@uni.edu"), "");
        }

        let results = e.search("match").unwrap();
        assert_eq!(results.people.len(), SEARCH_PEOPLE_LIMIT as usize);
        // With no names set, ties break on email
        assert_eq!(results.people[0].email, "match00@uni.edu");
    }

    #[test]
    fn test_posts_match_text_or_author_newest_first() {
        let e = engine();
        let robotics = named_user(&e, "club@uni.edu", "Robotics Club");
        let other = named_user(&e, "other@uni.edu", "Somebody Else");

        post(&e, other.id, "robotics meetup friday");
        post(&e, robotics.id, "general announcement");
        post(&e, other.id, "nothing relevant");

        let results = e.search("robotics").unwrap();
        assert_eq!(results.people.len(), 1);
        assert_eq!(results.posts.len(), 2);
        // Author-name match is newer, it comes first
        assert_eq!(results.posts[0].text, "general announcement");
        assert_eq!(results.posts[0].author_name, "Robotics Club");
        assert_eq!(results.posts[1].text, "robotics meetup friday");
    }

    #[test]
    fn test_post_overview_counts() {
        let e = engine();
        let author = named_user(&e, "author@uni.edu", "The Author");
        let fan = named_user(&e, "fan@uni.edu", "The Fan");
        let created = e
            .create_post(
                author.id,
                &PostDraft {
                    text: "searchable".to_string(),
                    photo: None,
                },
            )
            .unwrap();
        e.toggle_like(fan.id, created.id).unwrap();
        e.add_comment(fan.id, created.id, "found it").unwrap();

        let results = e.search("searchable").unwrap();
        assert_eq!(results.posts.len(), 1);
        assert_eq!(results.posts[0].likes_count, 1);
        assert_eq!(results.posts[0].comments_count, 1);
    }
}
