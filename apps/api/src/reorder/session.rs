//! The drag-and-drop reorder state machine.
//!
//! A [`DragSession`] captures a snapshot of the board when a drag starts,
//! applies live previews as the pointer moves, and on drop either rejects the
//! move (cross-bucket), does nothing (cancelled or same position), or emits a
//! single [`BatchUpdate`] plus a [`PendingCommit`] holding the snapshot. The
//! caller persists the batch and then resolves the pending commit on the
//! board: merge the authoritative rows on success, roll back on failure.

#![allow(dead_code)]

use tracing::debug;
use uuid::Uuid;

use crate::models::skill::{SkillCategory, SkillRow};
use crate::reorder::batch::{BatchUpdate, SkillPositionUpdate};
use crate::reorder::board::{BoardError, BoardSnapshot, SkillBoard, SkillRecord};

/// Shown to the user when a drag crosses bucket boundaries.
pub const CROSS_BUCKET_MESSAGE: &str = "Skills cannot be moved between categories";

/// What a pointer-movement or drop event reports about the tentative
/// destination. `visible_dest` is the destination bucket as the user sees it
/// (possibly search-filtered, dragged record excluded); `dest_index` indexes
/// into it. The session resolves the anchor back into the full bucket by
/// identity, so filtering never skews the ordering math.
#[derive(Debug, Clone)]
pub struct DragTarget {
    pub source_category: SkillCategory,
    pub dest_category: SkillCategory,
    pub dest_index: usize,
    pub visible_dest: Vec<Uuid>,
}

#[derive(Debug, PartialEq)]
pub enum PreviewOutcome {
    /// Preview ordering applied to the board (rendered, not persisted).
    Applied,
    /// Cross-bucket move; the pre-drag layout was restored.
    CrossBucket,
}

/// The terminal outcome of a drag.
#[derive(Debug)]
pub enum CommitOutcome {
    /// No destination was reported; the pre-drag layout stands.
    Cancelled,
    /// The record landed where it already was. No backend call.
    NoOp,
    /// Cross-bucket move; the pre-drag layout was restored. No backend call.
    Rejected { message: &'static str },
    /// Positions assigned optimistically; persist `batch`, then resolve
    /// `pending` against the board.
    Commit {
        batch: BatchUpdate,
        pending: PendingCommit,
    },
}

/// Token for an in-flight batch update. Holds the pre-drag snapshot so a
/// failed persist can restore the exact prior layout. Consuming it (either
/// way) clears the board's settling flag.
#[derive(Debug)]
pub struct PendingCommit {
    snapshot: BoardSnapshot,
}

pub struct DragSession<'b> {
    board: &'b mut SkillBoard,
    snapshot: BoardSnapshot,
    skill_id: Uuid,
}

impl<'b> DragSession<'b> {
    /// Starts a drag for `skill_id`. Fails if the record is unknown or if a
    /// prior commit is still settling (a second drag racing an unresolved
    /// batch update is rejected rather than allowed to interleave).
    pub fn begin(board: &'b mut SkillBoard, skill_id: Uuid) -> Result<DragSession<'b>, BoardError> {
        if board.is_settling() {
            return Err(BoardError::Settling);
        }
        if !board.contains(skill_id) {
            return Err(BoardError::UnknownSkill(skill_id));
        }
        let snapshot = board.snapshot();
        Ok(DragSession {
            board,
            snapshot,
            skill_id,
        })
    }

    /// Read access to the board mid-drag, for rendering the preview ordering
    /// while the session holds the mutable borrow.
    pub fn board(&self) -> &SkillBoard {
        self.board
    }

    /// The dragged record's own category. Authoritative over whatever the
    /// drag event claims as the source, since category is immutable during a
    /// reorder.
    fn home_category(&self) -> Option<SkillCategory> {
        self.board.record(self.skill_id).map(|r| r.category)
    }

    fn is_cross_bucket(&self, target: &DragTarget) -> bool {
        let home = self.home_category();
        target.source_category != target.dest_category || home != Some(target.dest_category)
    }

    /// Applies a live preview for one pointer-movement update.
    pub fn preview(&mut self, target: &DragTarget) -> PreviewOutcome {
        if self.is_cross_bucket(target) {
            self.board.restore(self.snapshot.clone());
            return PreviewOutcome::CrossBucket;
        }
        let index = self.resolve_insert_index(target);
        self.board
            .move_within(self.skill_id, target.dest_category, index);
        PreviewOutcome::Applied
    }

    /// Ends the drag. Consumes the session; on `Commit` the board is left in
    /// its optimistic state and settling until the pending commit resolves.
    pub fn commit(self, target: Option<&DragTarget>) -> CommitOutcome {
        let target = match target {
            Some(t) => t,
            None => {
                self.board.restore(self.snapshot);
                return CommitOutcome::Cancelled;
            }
        };

        if self.is_cross_bucket(target) {
            self.board.restore(self.snapshot);
            return CommitOutcome::Rejected {
                message: CROSS_BUCKET_MESSAGE,
            };
        }

        let index = self.resolve_insert_index(target);
        self.board
            .move_within(self.skill_id, target.dest_category, index);

        // Same final order as before the drag: nothing to persist.
        let final_order: Vec<Uuid> = self.board.bucket(target.dest_category).to_vec();
        let prior_order = self
            .snapshot
            .order
            .get(&target.dest_category)
            .cloned()
            .unwrap_or_default();
        if final_order == prior_order {
            self.board.restore(self.snapshot);
            return CommitOutcome::NoOp;
        }

        // Every record in the destination bucket gets its zero-based final
        // index as its new position. Only the dragged record echoes its
        // (unchanged) category, to guard against backend drift.
        let mut updates = Vec::with_capacity(final_order.len());
        for (i, id) in final_order.iter().enumerate() {
            let position = i as i32;
            if let Some(record) = self.board.record_mut(*id) {
                record.position = Some(position);
            }
            updates.push(SkillPositionUpdate {
                id: *id,
                position,
                category: (*id == self.skill_id).then_some(target.dest_category),
            });
        }

        self.board.set_settling(true);
        CommitOutcome::Commit {
            batch: BatchUpdate { updates },
            pending: PendingCommit {
                snapshot: self.snapshot,
            },
        }
    }

    /// Maps the visible anchor back to an index in the full bucket. The
    /// dragged record is removed before the anchor is located, so the index
    /// is valid for reinsertion. Past-the-end indices mean append.
    fn resolve_insert_index(&self, target: &DragTarget) -> usize {
        let remaining: Vec<Uuid> = self
            .board
            .bucket(target.dest_category)
            .iter()
            .copied()
            .filter(|id| *id != self.skill_id)
            .collect();
        match target.visible_dest.get(target.dest_index) {
            Some(anchor) => remaining
                .iter()
                .position(|id| id == anchor)
                .unwrap_or(remaining.len()),
            None => remaining.len(),
        }
    }
}

impl SkillBoard {
    /// Resolves a pending commit after the batch update succeeded: merges the
    /// authoritative rows back into the board. Rows not echoed by the backend
    /// are preserved as-is; the merge never drops or duplicates records, and
    /// the optimistic ordering stands.
    pub fn merge_authoritative(&mut self, pending: PendingCommit, rows: &[SkillRow]) {
        let _ = pending; // commit resolved; the snapshot is no longer needed
        for row in rows {
            match self.record_mut(row.id) {
                Some(existing) => {
                    // Category is immutable on the reorder path. An echoed
                    // row with a drifted category must not change bucket
                    // membership here, or the id would be stranded in its
                    // old bucket's ordering vector.
                    let home = existing.category;
                    *existing = SkillRecord::from_row(row);
                    existing.category = home;
                }
                None => debug!("batch update echoed unknown skill {}, ignoring", row.id),
            }
        }
        self.set_settling(false);
    }

    /// Resolves a pending commit after the batch update failed: restores the
    /// pre-drag snapshot wholesale. The user may immediately retry the drag.
    pub fn rollback(&mut self, pending: PendingCommit) {
        self.restore(pending.snapshot);
        self.set_settling(false);
    }
}
