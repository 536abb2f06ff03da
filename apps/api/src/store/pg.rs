use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::skill::SkillRow;
use crate::reorder::BatchUpdate;
use crate::store::{NewSkill, SkillStore};

/// Postgres-backed skill store.
pub struct PgSkillStore {
    pool: PgPool,
}

impl PgSkillStore {
    pub fn new(pool: PgPool) -> PgSkillStore {
        PgSkillStore { pool }
    }
}

#[async_trait]
impl SkillStore for PgSkillStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SkillRow>, AppError> {
        // NULLS LAST mirrors the board's ordering rule for legacy rows.
        Ok(sqlx::query_as::<_, SkillRow>(
            r#"
            SELECT * FROM skills
            WHERE user_id = $1
            ORDER BY category, position ASC NULLS LAST, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(&self, skill: NewSkill) -> Result<SkillRow, AppError> {
        // Append position is computed inside the statement; a separate
        // read-then-insert would let two concurrent creates in one bucket
        // both observe the same end-of-bucket index.
        Ok(sqlx::query_as::<_, SkillRow>(
            r#"
            INSERT INTO skills (id, user_id, name, category, proficiency, position)
            VALUES ($1, $2, $3, $4, $5,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM skills
                     WHERE user_id = $2 AND category = $4))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(skill.user_id)
        .bind(&skill.name)
        .bind(&skill.category)
        .bind(skill.proficiency)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Applies every position update in one transaction, scoped to the owner.
    /// The caller only distinguishes success from failure; on any error the
    /// transaction rolls back and nothing is partially applied.
    async fn batch_update_positions(
        &self,
        user_id: Uuid,
        batch: &BatchUpdate,
    ) -> Result<Vec<SkillRow>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut updated = Vec::with_capacity(batch.len());

        for update in &batch.updates {
            let row: Option<SkillRow> = sqlx::query_as(
                r#"
                UPDATE skills
                SET position = $1,
                    category = COALESCE($2, category),
                    updated_at = now()
                WHERE id = $3 AND user_id = $4
                RETURNING *
                "#,
            )
            .bind(update.position)
            .bind(update.category.map(|c| c.as_str()))
            .bind(update.id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

            match row {
                Some(row) => updated.push(row),
                None => {
                    // A submitted id the owner does not hold fails the whole
                    // batch; the transaction rolls back on drop.
                    return Err(AppError::NotFound(format!(
                        "Skill {} not found",
                        update.id
                    )));
                }
            }
        }

        tx.commit().await?;
        info!(
            "Persisted reorder of {} skills for user {user_id}",
            updated.len()
        );
        Ok(updated)
    }
}
