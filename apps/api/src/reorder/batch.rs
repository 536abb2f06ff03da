#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::skill::SkillCategory;

/// One partial update in a reorder commit. `category` is only set for the
/// record that was actually dragged; it echoes the unchanged category to
/// guard against backend drift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillPositionUpdate {
    pub id: Uuid,
    pub position: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<SkillCategory>,
}

/// The single backend call a committed drag produces: an ordered list of
/// position updates for every record in the destination bucket. The caller
/// treats the call as succeed-or-fail; it assumes nothing about backend-side
/// atomicity beyond that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchUpdate {
    pub updates: Vec<SkillPositionUpdate>,
}

impl BatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}
