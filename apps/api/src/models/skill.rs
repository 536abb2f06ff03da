#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A skill row as stored in Postgres. `position` is nullable: legacy rows
/// created before ordering existed have no position and sort after all
/// positioned rows, by name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub proficiency: i16,
    pub position: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The closed set of skill categories. A skill's category is immutable on the
/// reorder path; it only changes through an explicit edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    SoftSkills,
    Languages,
    Tools,
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 5] = [
        SkillCategory::Technical,
        SkillCategory::SoftSkills,
        SkillCategory::Languages,
        SkillCategory::Tools,
        SkillCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::SoftSkills => "soft_skills",
            SkillCategory::Languages => "languages",
            SkillCategory::Tools => "tools",
            SkillCategory::Other => "other",
        }
    }

    /// Parses a stored category string. Unknown values fall back to `Other`
    /// rather than failing the whole board load.
    pub fn parse(s: &str) -> SkillCategory {
        match s {
            "technical" => SkillCategory::Technical,
            "soft_skills" => SkillCategory::SoftSkills,
            "languages" => SkillCategory::Languages,
            "tools" => SkillCategory::Tools,
            _ => SkillCategory::Other,
        }
    }
}

/// Proficiency as a 1–4 ordinal, mapped from the labels the profile UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
}

impl Proficiency {
    pub fn ordinal(&self) -> i16 {
        *self as i16
    }

    pub fn from_ordinal(n: i16) -> Option<Proficiency> {
        match n {
            1 => Some(Proficiency::Beginner),
            2 => Some(Proficiency::Intermediate),
            3 => Some(Proficiency::Advanced),
            4 => Some(Proficiency::Expert),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Expert => "Expert",
        }
    }
}
