//! Axum route handlers for the Skills API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::skill::{Proficiency, SkillCategory};
use crate::reorder::{
    BoardError, CommitOutcome, DragSession, DragTarget, SkillBoard, SkillRecord,
};
use crate::state::AppState;
use crate::store::NewSkill;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SkillView {
    pub id: Uuid,
    pub name: String,
    pub proficiency: Proficiency,
    pub position: Option<i32>,
}

impl SkillView {
    fn from_record(record: &SkillRecord) -> SkillView {
        SkillView {
            id: record.id,
            name: record.name.clone(),
            proficiency: record.proficiency,
            position: record.position,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BucketView {
    pub category: SkillCategory,
    pub skills: Vec<SkillView>,
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub buckets: Vec<BucketView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub user_id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub proficiency: Proficiency,
}

/// Body of the drag-commit call. `visible_dest` is the destination bucket as
/// the client currently renders it (search filter applied, dragged record
/// excluded); `dest_index` indexes into it.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub source_category: SkillCategory,
    pub dest_category: SkillCategory,
    pub dest_index: usize,
    pub visible_dest: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub status: String,
    pub updated: usize,
    pub buckets: Vec<BucketView>,
}

fn bucket_views(board: &SkillBoard) -> Vec<BucketView> {
    SkillCategory::ALL
        .iter()
        .filter(|cat| !board.bucket(**cat).is_empty())
        .map(|cat| BucketView {
            category: *cat,
            skills: board
                .bucket_records(*cat)
                .iter()
                .map(|r| SkillView::from_record(r))
                .collect(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SkillListResponse>, AppError> {
    let rows = state.store.list_for_user(params.user_id).await?;
    let board = SkillBoard::from_rows(&rows);
    Ok(Json(SkillListResponse {
        buckets: bucket_views(&board),
    }))
}

/// POST /api/v1/skills
/// New skills append at the end of their bucket; the store assigns the
/// position.
pub async fn handle_create_skill(
    State(state): State<AppState>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<SkillView>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Skill name must not be empty".into()));
    }

    let row = state
        .store
        .insert(NewSkill {
            user_id: req.user_id,
            name: name.to_string(),
            category: req.category.as_str().to_string(),
            proficiency: req.proficiency.ordinal(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SkillView::from_record(&SkillRecord::from_row(&row))),
    ))
}

/// DELETE /api/v1/skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let deleted = state.store.delete(params.user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Skill {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/skills/reorder
///
/// Commits one drag gesture: builds the owner's board from current rows, runs
/// a drag session against it, and persists the resulting batch update. A
/// cross-category move never reaches the store; a failed persist rolls the
/// board back and surfaces the failure once.
pub async fn handle_reorder(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, AppError> {
    let rows = state.store.list_for_user(req.user_id).await?;
    let mut board = SkillBoard::from_rows(&rows);

    let session = DragSession::begin(&mut board, req.skill_id).map_err(|e| match e {
        BoardError::UnknownSkill(_) => AppError::NotFound(e.to_string()),
        BoardError::Settling => AppError::Conflict(e.to_string()),
    })?;

    let target = DragTarget {
        source_category: req.source_category,
        dest_category: req.dest_category,
        dest_index: req.dest_index,
        visible_dest: req.visible_dest,
    };

    match session.commit(Some(&target)) {
        CommitOutcome::Cancelled | CommitOutcome::NoOp => Ok(Json(ReorderResponse {
            status: "noop".to_string(),
            updated: 0,
            buckets: bucket_views(&board),
        })),
        CommitOutcome::Rejected { message } => Err(AppError::Validation(message.to_string())),
        CommitOutcome::Commit { batch, pending } => {
            match state.store.batch_update_positions(req.user_id, &batch).await {
                Ok(updated_rows) => {
                    let updated = updated_rows.len();
                    board.merge_authoritative(pending, &updated_rows);
                    Ok(Json(ReorderResponse {
                        status: "reordered".to_string(),
                        updated,
                        buckets: bucket_views(&board),
                    }))
                }
                Err(e) => {
                    warn!("Batch position update failed, rolling back: {e}");
                    board.rollback(pending);
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::models::skill::SkillRow;
    use crate::reorder::{BatchUpdate, CROSS_BUCKET_MESSAGE};
    use crate::store::SkillStore;

    /// In-memory store standing in for Postgres. `fail_batch` simulates a
    /// network failure on the batch update call.
    struct MockSkillStore {
        rows: Mutex<Vec<SkillRow>>,
        fail_batch: AtomicBool,
        batch_calls: AtomicUsize,
    }

    impl MockSkillStore {
        fn with_rows(rows: Vec<SkillRow>) -> Arc<MockSkillStore> {
            Arc::new(MockSkillStore {
                rows: Mutex::new(rows),
                fail_batch: AtomicBool::new(false),
                batch_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SkillStore for MockSkillStore {
        async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SkillRow>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert(&self, skill: NewSkill) -> Result<SkillRow, AppError> {
            let mut rows = self.rows.lock().unwrap();
            // Same rule as the Postgres store: one past the bucket's max.
            let next = rows
                .iter()
                .filter(|r| r.user_id == skill.user_id && r.category == skill.category)
                .filter_map(|r| r.position)
                .max()
                .map_or(0, |p| p + 1);
            let now = Utc::now();
            let row = SkillRow {
                id: Uuid::new_v4(),
                user_id: skill.user_id,
                name: skill.name,
                category: skill.category,
                proficiency: skill.proficiency,
                position: Some(next),
                created_at: now,
                updated_at: now,
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.id == id && r.user_id == user_id));
            Ok(rows.len() < before)
        }

        async fn batch_update_positions(
            &self,
            user_id: Uuid,
            batch: &BatchUpdate,
        ) -> Result<Vec<SkillRow>, AppError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_batch.load(Ordering::SeqCst) {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "simulated network failure"
                )));
            }
            let mut rows = self.rows.lock().unwrap();
            let mut updated = Vec::new();
            for update in &batch.updates {
                let row = rows
                    .iter_mut()
                    .find(|r| r.id == update.id && r.user_id == user_id)
                    .ok_or_else(|| AppError::NotFound(format!("Skill {} not found", update.id)))?;
                row.position = Some(update.position);
                if let Some(cat) = update.category {
                    row.category = cat.as_str().to_string();
                }
                updated.push(row.clone());
            }
            Ok(updated)
        }
    }

    fn skill_row(user_id: Uuid, name: &str, category: SkillCategory, pos: Option<i32>) -> SkillRow {
        let now = Utc::now();
        SkillRow {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            category: category.as_str().to_string(),
            proficiency: 2,
            position: pos,
            created_at: now,
            updated_at: now,
        }
    }

    fn technical_fixture(user_id: Uuid) -> Vec<SkillRow> {
        vec![
            skill_row(user_id, "Python", SkillCategory::Technical, Some(0)),
            skill_row(user_id, "SQL", SkillCategory::Technical, Some(1)),
            skill_row(user_id, "Go", SkillCategory::Technical, Some(2)),
        ]
    }

    fn state_with(store: Arc<MockSkillStore>) -> AppState {
        AppState { store }
    }

    fn bucket_names(resp: &ReorderResponse, category: SkillCategory) -> Vec<String> {
        resp.buckets
            .iter()
            .find(|b| b.category == category)
            .map(|b| b.skills.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_reorder_persists_and_reports_new_order() {
        let user_id = Uuid::new_v4();
        let rows = technical_fixture(user_id);
        let (python, sql, go) = (rows[0].id, rows[1].id, rows[2].id);
        let store = MockSkillStore::with_rows(rows);
        let state = state_with(store.clone());

        let Json(resp) = handle_reorder(
            State(state),
            Json(ReorderRequest {
                user_id,
                skill_id: go,
                source_category: SkillCategory::Technical,
                dest_category: SkillCategory::Technical,
                dest_index: 0,
                visible_dest: vec![python, sql],
            }),
        )
        .await
        .unwrap();

        assert_eq!(resp.status, "reordered");
        assert_eq!(resp.updated, 3);
        assert_eq!(
            bucket_names(&resp, SkillCategory::Technical),
            vec!["Go", "Python", "SQL"]
        );
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 1);

        // The store now holds the committed positions.
        let stored = store.list_for_user(user_id).await.unwrap();
        let go_row = stored.iter().find(|r| r.id == go).unwrap();
        assert_eq!(go_row.position, Some(0));
    }

    #[tokio::test]
    async fn test_cross_category_reorder_rejected_without_store_call() {
        let user_id = Uuid::new_v4();
        let rows = vec![
            skill_row(user_id, "Python", SkillCategory::Technical, Some(0)),
            skill_row(user_id, "Leadership", SkillCategory::SoftSkills, Some(0)),
        ];
        let (python, leadership) = (rows[0].id, rows[1].id);
        let store = MockSkillStore::with_rows(rows);
        let state = state_with(store.clone());

        let err = handle_reorder(
            State(state),
            Json(ReorderRequest {
                user_id,
                skill_id: python,
                source_category: SkillCategory::Technical,
                dest_category: SkillCategory::SoftSkills,
                dest_index: 0,
                visible_dest: vec![leadership],
            }),
        )
        .await
        .err()
        .unwrap();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, CROSS_BUCKET_MESSAGE),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 0);

        // Both buckets are untouched in the store.
        let stored = store.list_for_user(user_id).await.unwrap();
        let python_row = stored.iter().find(|r| r.id == python).unwrap();
        assert_eq!(python_row.category, "technical");
        assert_eq!(python_row.position, Some(0));
    }

    #[tokio::test]
    async fn test_failed_batch_surfaces_error_and_leaves_store_untouched() {
        let user_id = Uuid::new_v4();
        let rows = technical_fixture(user_id);
        let (python, sql, go) = (rows[0].id, rows[1].id, rows[2].id);
        let store = MockSkillStore::with_rows(rows);
        store.fail_batch.store(true, Ordering::SeqCst);
        let state = state_with(store.clone());

        let err = handle_reorder(
            State(state),
            Json(ReorderRequest {
                user_id,
                skill_id: go,
                source_category: SkillCategory::Technical,
                dest_category: SkillCategory::Technical,
                dest_index: 0,
                visible_dest: vec![python, sql],
            }),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 1);

        // Pre-drag positions survive the failure.
        let stored = store.list_for_user(user_id).await.unwrap();
        let positions: Vec<Option<i32>> = stored.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_same_position_drop_issues_no_batch() {
        let user_id = Uuid::new_v4();
        let rows = technical_fixture(user_id);
        let (python, sql, go) = (rows[0].id, rows[1].id, rows[2].id);
        let store = MockSkillStore::with_rows(rows);
        let state = state_with(store.clone());

        let Json(resp) = handle_reorder(
            State(state),
            Json(ReorderRequest {
                user_id,
                skill_id: sql,
                source_category: SkillCategory::Technical,
                dest_category: SkillCategory::Technical,
                dest_index: 1,
                visible_dest: vec![python, go],
            }),
        )
        .await
        .unwrap();

        assert_eq!(resp.status, "noop");
        assert_eq!(resp.updated, 0);
        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_groups_skills_into_buckets() {
        let user_id = Uuid::new_v4();
        let rows = vec![
            skill_row(user_id, "SQL", SkillCategory::Technical, Some(1)),
            skill_row(user_id, "Python", SkillCategory::Technical, Some(0)),
            skill_row(user_id, "Rust", SkillCategory::Technical, None),
            skill_row(user_id, "Leadership", SkillCategory::SoftSkills, Some(0)),
        ];
        let store = MockSkillStore::with_rows(rows);
        let state = state_with(store);

        let Json(resp) = handle_list_skills(State(state), Query(UserIdQuery { user_id }))
            .await
            .unwrap();

        assert_eq!(resp.buckets.len(), 2);
        let technical = &resp.buckets[0];
        assert_eq!(technical.category, SkillCategory::Technical);
        let names: Vec<&str> = technical.skills.iter().map(|s| s.name.as_str()).collect();
        // Positioned rows first in position order, then unpositioned by name.
        assert_eq!(names, vec!["Python", "SQL", "Rust"]);
    }

    #[tokio::test]
    async fn test_create_appends_at_end_of_bucket() {
        let user_id = Uuid::new_v4();
        let store = MockSkillStore::with_rows(technical_fixture(user_id));
        let state = state_with(store.clone());

        let (status, Json(view)) = handle_create_skill(
            State(state),
            Json(CreateSkillRequest {
                user_id,
                name: "Rust".to_string(),
                category: SkillCategory::Technical,
                proficiency: Proficiency::Advanced,
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.position, Some(3));
        assert_eq!(view.proficiency, Proficiency::Advanced);
    }

    // Positions are assigned by the store at insert time, never computed
    // from a previously listed board, so successive creates in one bucket
    // always get distinct ascending positions.
    #[tokio::test]
    async fn test_successive_creates_get_distinct_positions() {
        let user_id = Uuid::new_v4();
        let store = MockSkillStore::with_rows(vec![]);
        let state = state_with(store);

        let mut positions = Vec::new();
        for name in ["Python", "SQL", "Go"] {
            let (_, Json(view)) = handle_create_skill(
                State(state.clone()),
                Json(CreateSkillRequest {
                    user_id,
                    name: name.to_string(),
                    category: SkillCategory::Technical,
                    proficiency: Proficiency::Intermediate,
                }),
            )
            .await
            .unwrap();
            positions.push(view.position);
        }

        assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let user_id = Uuid::new_v4();
        let store = MockSkillStore::with_rows(vec![]);
        let state = state_with(store);

        let err = handle_create_skill(
            State(state),
            Json(CreateSkillRequest {
                user_id,
                name: "   ".to_string(),
                category: SkillCategory::Technical,
                proficiency: Proficiency::Beginner,
            }),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_skill_is_not_found() {
        let user_id = Uuid::new_v4();
        let store = MockSkillStore::with_rows(vec![]);
        let state = state_with(store);

        let err = handle_delete_skill(
            State(state),
            Path(Uuid::new_v4()),
            Query(UserIdQuery { user_id }),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
