// Skills API surface: list (grouped into buckets), add, delete, and the
// drag-commit reorder endpoint. All persistence goes through the SkillStore
// trait in `store`.

pub mod handlers;
