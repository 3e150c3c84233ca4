// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};

/// An account. Auth (passwords, sessions) lives outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: String,
}

/// Degree program offered on campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Major {
    #[serde(rename = "CST")]
    Cst,
    #[serde(rename = "CS")]
    Cs,
    #[serde(rename = "CT")]
    Ct,
}

impl Major {
    /// Stable code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Major::Cst => "CST",
            Major::Cs => "CS",
            Major::Ct => "CT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Major::Cst => "CST",
            Major::Cs => "Computer Science (CS)",
            Major::Ct => "Computer Technology (CT)",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CST" => Some(Major::Cst),
            "CS" => Some(Major::Cs),
            "CT" => Some(Major::Ct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcademicYear {
    #[serde(rename = "FIRST_YEAR")]
    First,
    #[serde(rename = "SECOND_YEAR")]
    Second,
    #[serde(rename = "THIRD_YEAR")]
    Third,
    #[serde(rename = "FOURTH_YEAR")]
    Fourth,
    #[serde(rename = "FINAL_YEAR")]
    Final,
}

impl AcademicYear {
    /// Stable code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            AcademicYear::First => "FIRST_YEAR",
            AcademicYear::Second => "SECOND_YEAR",
            AcademicYear::Third => "THIRD_YEAR",
            AcademicYear::Fourth => "FOURTH_YEAR",
            AcademicYear::Final => "FINAL_YEAR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AcademicYear::First => "First year",
            AcademicYear::Second => "Second year",
            AcademicYear::Third => "Third year",
            AcademicYear::Fourth => "Fourth year",
            AcademicYear::Final => "Final year",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FIRST_YEAR" => Some(AcademicYear::First),
            "SECOND_YEAR" => Some(AcademicYear::Second),
            "THIRD_YEAR" => Some(AcademicYear::Third),
            "FOURTH_YEAR" => Some(AcademicYear::Fourth),
            "FINAL_YEAR" => Some(AcademicYear::Final),
            _ => None,
        }
    }
}

/// Campus profile, one per user, provisioned at account creation.
///
/// The three `*_count` fields are denormalized tallies maintained by the
/// engine; [`crate::Engine::reconcile_counters`] recomputes them from the
/// underlying rows if they ever drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: String,
    pub bio: String,
    pub major: Option<Major>,
    pub year: Option<AcademicYear>,
    pub roll_no: Option<String>,
    /// Caller-supplied path or URL; the engine never interprets it.
    pub photo: Option<String>,
    pub phone_no: Option<String>,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

impl Profile {
    /// Name to show for this user: the full name when set, else `email`.
    pub fn display_name<'a>(&'a self, email: &'a str) -> &'a str {
        let name = self.full_name.trim();
        if name.is_empty() { email } else { name }
    }
}

/// Editable profile fields, applied as a full replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: String,
    pub major: Option<Major>,
    pub year: Option<AcademicYear>,
    pub roll_no: Option<String>,
    pub photo: Option<String>,
    pub phone_no: Option<String>,
}

/// One row in a followers/following listing, annotated with whether the
/// *viewer* follows the listed user.
#[derive(Debug, Clone, Serialize)]
pub struct FollowEntry {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub photo: Option<String>,
    pub is_following: bool,
}

/// One row in the staff dashboard's users table.
#[derive(Debug, Clone, Serialize)]
pub struct UserOverview {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub date_joined: String,
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_code_round_trip() {
        for major in [Major::Cst, Major::Cs, Major::Ct] {
            assert_eq!(Major::from_code(major.code()), Some(major));
        }
        assert_eq!(Major::from_code("EE"), None);
    }

    #[test]
    fn test_academic_year_code_round_trip() {
        for year in [
            AcademicYear::First,
            AcademicYear::Second,
            AcademicYear::Third,
            AcademicYear::Fourth,
            AcademicYear::Final,
        ] {
            assert_eq!(AcademicYear::from_code(year.code()), Some(year));
        }
        assert_eq!(AcademicYear::from_code("FIFTH_YEAR"), None);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut profile = Profile {
            user_id: 1,
            full_name: String::new(),
            bio: String::new(),
            major: None,
            year: None,
            roll_no: None,
            photo: None,
            phone_no: None,
            posts_count: 0,
            followers_count: 0,
            following_count: 0,
        };
        assert_eq!(profile.display_name("a@uni.edu"), "a@uni.edu");

        profile.full_name = "   ".to_string();
        assert_eq!(profile.display_name("a@uni.edu"), "a@uni.edu");

        profile.full_name = "Aye Chan".to_string();
        assert_eq!(profile.display_name("a@uni.edu"), "Aye Chan");
    }
}
