//! Skill persistence behind a trait, so handlers and reorder flows can run
//! against an in-memory store in tests.
//!
//! `AppState` holds an `Arc<dyn SkillStore>`; the Postgres implementation is
//! the only production backend.

pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::skill::SkillRow;
use crate::reorder::BatchUpdate;

/// The profile data-access seam for skills. `batch_update_positions` is the
/// single call a committed reorder produces; it returns the updated
/// authoritative rows (a subset or the full set of the submitted ids).
#[async_trait]
pub trait SkillStore: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SkillRow>, AppError>;

    async fn insert(&self, skill: NewSkill) -> Result<SkillRow, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    async fn batch_update_positions(
        &self,
        user_id: Uuid,
        batch: &BatchUpdate,
    ) -> Result<Vec<SkillRow>, AppError>;
}

/// A skill to insert. The store assigns the position (one past the bucket's
/// current maximum) inside the insert itself, so two concurrent creates in
/// one bucket cannot both observe the same end-of-bucket index.
#[derive(Debug, Clone)]
pub struct NewSkill {
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub proficiency: i16,
}
