// Skill reorder reconciler.
// Implements: category buckets, drag sessions with snapshot rollback,
// batch-update commit with authoritative merge. Cross-bucket moves are
// rejected here, before anything reaches the store.

pub mod batch;
pub mod board;
pub mod session;

// Re-export the public API consumed by handlers and the store.
pub use batch::{BatchUpdate, SkillPositionUpdate};
pub use board::{BoardError, SkillBoard, SkillRecord};
pub use session::{CommitOutcome, DragSession, DragTarget, CROSS_BUCKET_MESSAGE};
