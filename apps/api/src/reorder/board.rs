#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::skill::{Proficiency, SkillCategory, SkillRow};

/// A skill as the board sees it. Stripped of row bookkeeping; `position` is
/// the stored value, which may lag the ordering vector until a commit lands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillRecord {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub proficiency: Proficiency,
    pub position: Option<i32>,
}

impl SkillRecord {
    pub fn from_row(row: &SkillRow) -> SkillRecord {
        SkillRecord {
            id: row.id,
            name: row.name.clone(),
            category: SkillCategory::parse(&row.category),
            proficiency: Proficiency::from_ordinal(row.proficiency)
                .unwrap_or(Proficiency::Beginner),
            position: row.position,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("skill {0} is not on the board")]
    UnknownSkill(Uuid),

    #[error("a previous reorder is still being saved")]
    Settling,
}

/// Pre-drag copy of a board's layout, held by a [`DragSession`] for rollback.
///
/// [`DragSession`]: super::session::DragSession
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub(super) records: HashMap<Uuid, SkillRecord>,
    pub(super) order: BTreeMap<SkillCategory, Vec<Uuid>>,
}

/// One user's skills grouped into category buckets.
///
/// Records live in a map keyed by stable id; display order is a separate
/// ordering vector per bucket. All reordering math works on these vectors by
/// identity — never on indices taken from a filtered view, because filtering
/// changes indices.
#[derive(Debug, Clone)]
pub struct SkillBoard {
    records: HashMap<Uuid, SkillRecord>,
    order: BTreeMap<SkillCategory, Vec<Uuid>>,
    /// Set while a batch update is in flight. A new drag may not start until
    /// the pending commit resolves (merge or rollback clears it).
    settling: bool,
}

impl SkillBoard {
    /// Builds a board from stored rows. Within each bucket, positioned rows
    /// come first in ascending position order; rows without a position sort
    /// after all positioned rows, by name.
    pub fn from_rows(rows: &[SkillRow]) -> SkillBoard {
        let mut records = HashMap::with_capacity(rows.len());
        let mut order: BTreeMap<SkillCategory, Vec<Uuid>> = BTreeMap::new();

        for row in rows {
            let record = SkillRecord::from_row(row);
            order.entry(record.category).or_default().push(record.id);
            records.insert(record.id, record);
        }

        for ids in order.values_mut() {
            ids.sort_by(|a, b| {
                let ra = &records[a];
                let rb = &records[b];
                match (ra.position, rb.position) {
                    (Some(pa), Some(pb)) => pa.cmp(&pb).then_with(|| ra.name.cmp(&rb.name)),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => ra.name.cmp(&rb.name),
                }
            });
        }

        SkillBoard {
            records,
            order,
            settling: false,
        }
    }

    pub fn record(&self, id: Uuid) -> Option<&SkillRecord> {
        self.records.get(&id)
    }

    /// Ordering vector for one bucket. Empty if the bucket has no skills.
    pub fn bucket(&self, category: SkillCategory) -> &[Uuid] {
        self.order.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_records(&self, category: SkillCategory) -> Vec<&SkillRecord> {
        self.bucket(category)
            .iter()
            .map(|id| &self.records[id])
            .collect()
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub(super) fn set_settling(&mut self, settling: bool) {
        self.settling = settling;
    }

    /// Full deep copy of the board's layout, taken at drag start so any
    /// invalid or failed operation can restore the exact pre-drag view.
    pub(super) fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            records: self.records.clone(),
            order: self.order.clone(),
        }
    }

    /// Wholesale restore from a snapshot. Swaps the whole layout back rather
    /// than attempting field-level undo. Leaves the settling flag alone.
    pub(super) fn restore(&mut self, snapshot: BoardSnapshot) {
        self.records = snapshot.records;
        self.order = snapshot.order;
    }

    /// Removes `id` from its bucket (by identity) and reinserts it at
    /// `index` in `category`'s bucket, clamping past-the-end indices to an
    /// append. Caller has already verified this is not a cross-bucket move.
    pub(super) fn move_within(&mut self, id: Uuid, category: SkillCategory, index: usize) {
        let ids = self.order.entry(category).or_default();
        ids.retain(|x| *x != id);
        let index = index.min(ids.len());
        ids.insert(index, id);
    }

    pub(super) fn record_mut(&mut self, id: Uuid) -> Option<&mut SkillRecord> {
        self.records.get_mut(&id)
    }

    pub(super) fn contains(&self, id: Uuid) -> bool {
        self.records.contains_key(&id)
    }
}
