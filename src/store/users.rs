// SPDX-License-Identifier: MPL-2.0

//! Row-level helpers for users, profiles, and the registration log.
//!
//! Every function takes a plain `&Connection` so callers can run several of
//! them inside one transaction (a `Transaction` derefs to `Connection`).

use crate::types::{AcademicYear, Major, Profile, ProfileUpdate, User};
use rusqlite::{Connection, params};

use crate::store::StoreError;

/// Denormalized counters on a profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileCounter {
    Posts,
    Followers,
    Following,
}

impl ProfileCounter {
    fn column(self) -> &'static str {
        match self {
            ProfileCounter::Posts => "posts_count",
            ProfileCounter::Followers => "followers_count",
            ProfileCounter::Following => "following_count",
        }
    }
}

/// Insert a user row. The caller normalizes the email and checks for
/// duplicates first; the UNIQUE index is the backstop.
pub fn insert_user(
    conn: &Connection,
    email: &str,
    is_staff: bool,
    now: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        r#"
        INSERT INTO users (email, is_staff, is_active, date_joined)
        VALUES (?1, ?2, 1, ?3)
        "#,
        params![email, is_staff as i32, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, StoreError> {
    let mut stmt = conn.prepare("SELECT 1 FROM users WHERE email = ?")?;
    Ok(stmt.exists([email])?)
}

pub fn user_exists(conn: &Connection, user_id: i64) -> Result<bool, StoreError> {
    let mut stmt = conn.prepare("SELECT 1 FROM users WHERE id = ?")?;
    Ok(stmt.exists([user_id])?)
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<User, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, email, is_staff, is_active, date_joined
        FROM users
        WHERE id = ?
        "#,
    )?;

    let user = stmt
        .query_row([user_id], |row| {
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                is_staff: row.get::<_, i32>(2)? != 0,
                is_active: row.get::<_, i32>(3)? != 0,
                date_joined: row.get(4)?,
            })
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })?;

    Ok(user)
}

/// Create the profile row for a new user, a no-op if one already exists.
/// This is the sole provisioning path, so a redundant trigger can never
/// raise a uniqueness error or duplicate the row.
pub fn insert_profile_if_absent(conn: &Connection, user_id: i64) -> Result<(), StoreError> {
    conn.execute(
        r#"
        INSERT INTO profiles (user_id)
        VALUES (?1)
        ON CONFLICT(user_id) DO NOTHING
        "#,
        [user_id],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, user_id: i64) -> Result<Profile, StoreError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT user_id, full_name, bio, major, year, roll_no, photo, phone_no,
               posts_count, followers_count, following_count
        FROM profiles
        WHERE user_id = ?
        "#,
    )?;

    let profile = stmt
        .query_row([user_id], |row| {
            let major: Option<String> = row.get(3)?;
            let year: Option<String> = row.get(4)?;
            Ok(Profile {
                user_id: row.get(0)?,
                full_name: row.get(1)?,
                bio: row.get(2)?,
                major: major.as_deref().and_then(Major::from_code),
                year: year.as_deref().and_then(AcademicYear::from_code),
                roll_no: row.get(5)?,
                photo: row.get(6)?,
                phone_no: row.get(7)?,
                posts_count: row.get(8)?,
                followers_count: row.get(9)?,
                following_count: row.get(10)?,
            })
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Database(other),
        })?;

    Ok(profile)
}

/// Replace the editable profile fields. Counters are untouched.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        r#"
        UPDATE profiles
        SET full_name = ?1, bio = ?2, major = ?3, year = ?4,
            roll_no = ?5, photo = ?6, phone_no = ?7
        WHERE user_id = ?8
        "#,
        params![
            update.full_name,
            update.bio,
            update.major.map(Major::code),
            update.year.map(AcademicYear::code),
            update.roll_no,
            update.photo,
            update.phone_no,
            user_id,
        ],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Relative counter update; `delta` is +1 or -1 at every call site.
pub fn bump_profile_counter(
    conn: &Connection,
    user_id: i64,
    counter: ProfileCounter,
    delta: i64,
) -> Result<(), StoreError> {
    let sql = format!(
        "UPDATE profiles SET {col} = {col} + ?1 WHERE user_id = ?2",
        col = counter.column()
    );
    conn.execute(&sql, params![delta, user_id])?;
    Ok(())
}

pub fn insert_registration(
    conn: &Connection,
    user_id: i64,
    source: &str,
    now: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO registration_log (user_id, source, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, source, now],
    )?;
    Ok(())
}

/// Delete a user row; content and relationship rows go with it by cascade.
/// Returns whether a row was deleted.
pub fn delete_user(conn: &Connection, user_id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?", [user_id])?;
    Ok(changed == 1)
}
