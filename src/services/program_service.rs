use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    clean_optional, recalculate_phases, trim_text, CreateProgramRequest, Program, ProgramPhase,
    UpdateProgramRequest,
};
use crate::services::change_feed::{ChangeBus, EntityKind};

const PROGRAM_COLUMNS: &str = "id, name, subtitle, description, start_date, current_week, \
    total_weeks, phases, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ProgramService {
    db: PgPool,
    changes: ChangeBus,
}

impl ProgramService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn list_programs(&self, include_inactive: bool) -> Result<Vec<Program>> {
        let filter = if include_inactive { "" } else { "WHERE is_active = TRUE" };
        let programs = sqlx::query_as::<_, Program>(&format!(
            "SELECT {} FROM programs {} ORDER BY start_date DESC, name ASC",
            PROGRAM_COLUMNS, filter
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(programs)
    }

    pub async fn get_program(&self, program_id: Uuid) -> Result<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(&format!(
            "SELECT {} FROM programs WHERE id = $1",
            PROGRAM_COLUMNS
        ))
        .bind(program_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(program)
    }

    pub async fn create_program(
        &self,
        request: CreateProgramRequest,
        today: NaiveDate,
    ) -> Result<Program> {
        let phases: Vec<ProgramPhase> = request.phases.into_iter().map(Into::into).collect();
        let schedule = recalculate_phases(
            &phases,
            request.start_date,
            request.total_weeks.unwrap_or(1),
            today,
        );

        let program = sqlx::query_as::<_, Program>(&format!(
            r#"
            INSERT INTO programs (
                name, subtitle, description, start_date, current_week,
                total_weeks, phases, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        ))
        .bind(request.name.trim())
        .bind(clean_optional(request.subtitle))
        .bind(clean_optional(request.description))
        .bind(request.start_date)
        .bind(schedule.current_week)
        .bind(schedule.total_weeks)
        .bind(Json(schedule.phases))
        .bind(request.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        info!(
            "Created program {} ({} weeks, {} phases)",
            program.id,
            program.total_weeks,
            program.phases.0.len()
        );
        self.changes.created(EntityKind::Program, program.id);
        Ok(program)
    }

    /// Apply a partial update, then recompute week fields from the merged row
    pub async fn update_program(
        &self,
        program_id: Uuid,
        request: UpdateProgramRequest,
        today: NaiveDate,
    ) -> Result<Option<Program>> {
        let mut tx = self.db.begin().await?;
        let Some(existing) = Self::lock_program(&mut tx, program_id).await? else {
            return Ok(None);
        };

        let phases: Vec<ProgramPhase> = match request.phases {
            Some(inputs) => inputs.into_iter().map(Into::into).collect(),
            None => existing.phases.0.clone(),
        };
        let start_date = request.start_date.unwrap_or(existing.start_date);
        let total_weeks = request.total_weeks.unwrap_or(existing.total_weeks);
        let schedule = recalculate_phases(&phases, start_date, total_weeks, today);

        let program = sqlx::query_as::<_, Program>(&format!(
            r#"
            UPDATE programs
            SET
                name = COALESCE($2, name),
                subtitle = CASE WHEN $3::text IS NULL THEN subtitle ELSE NULLIF($3, '') END,
                description = CASE WHEN $4::text IS NULL THEN description ELSE NULLIF($4, '') END,
                start_date = $5,
                current_week = $6,
                total_weeks = $7,
                phases = $8,
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROGRAM_COLUMNS
        ))
        .bind(program_id)
        .bind(request.name.map(|n| n.trim().to_string()))
        .bind(trim_text(request.subtitle))
        .bind(trim_text(request.description))
        .bind(start_date)
        .bind(schedule.current_week)
        .bind(schedule.total_weeks)
        .bind(Json(schedule.phases))
        .bind(request.is_active)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.changes.updated(EntityKind::Program, program.id);
        Ok(Some(program))
    }

    /// Persist current week and phase statuses as of `today`
    pub async fn recalculate(&self, program_id: Uuid, today: NaiveDate) -> Result<Option<Program>> {
        self.update_program(program_id, UpdateProgramRequest::default(), today)
            .await
    }

    pub async fn delete_program(&self, program_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(program_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::Program, program_id);
        }
        Ok(deleted)
    }

    async fn lock_program(
        tx: &mut Transaction<'_, Postgres>,
        program_id: Uuid,
    ) -> Result<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(&format!(
            "SELECT {} FROM programs WHERE id = $1 FOR UPDATE",
            PROGRAM_COLUMNS
        ))
        .bind(program_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(program)
    }
}
