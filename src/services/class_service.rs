use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{types::Json, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    clean_optional, trim_text, ClassCounters, ClassIntensity, ClassStatus, CreateClassRequest,
    DEFAULT_MAX_PARTICIPANTS, GymClass, UpdateClassRequest, WorkoutBreakdown,
};
use crate::services::change_feed::{ChangeBus, EntityKind};

const CLASS_COLUMNS: &str = "id, title, description, class_date, start_time, duration_minutes, \
    intensity, instructor, max_participants, status, workout, created_at, updated_at";

/// Filters for the class schedule
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub status: Option<ClassStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ClassService {
    db: PgPool,
    changes: ChangeBus,
}

impl ClassService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<GymClass>> {
        let mut query = format!("SELECT {} FROM gym_classes WHERE 1 = 1", CLASS_COLUMNS);
        let mut param_count = 1;

        if filter.status.is_some() {
            query.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if filter.from.is_some() {
            query.push_str(&format!(" AND class_date >= ${}", param_count));
            param_count += 1;
        }
        if filter.to.is_some() {
            query.push_str(&format!(" AND class_date <= ${}", param_count));
        }
        query.push_str(" ORDER BY class_date ASC, start_time ASC");

        let mut query_builder = sqlx::query_as::<_, GymClass>(&query);
        if let Some(status) = filter.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(from) = filter.from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = filter.to {
            query_builder = query_builder.bind(to);
        }

        let classes = query_builder.fetch_all(&self.db).await?;
        Ok(classes)
    }

    pub async fn get_class(&self, class_id: Uuid) -> Result<Option<GymClass>> {
        let class = sqlx::query_as::<_, GymClass>(&format!(
            "SELECT {} FROM gym_classes WHERE id = $1",
            CLASS_COLUMNS
        ))
        .bind(class_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(class)
    }

    /// Insert a class. `workout` is the resolved breakdown (explicit or from a template).
    pub async fn create_class(
        &self,
        request: CreateClassRequest,
        workout: WorkoutBreakdown,
    ) -> Result<GymClass> {
        let class = sqlx::query_as::<_, GymClass>(&format!(
            r#"
            INSERT INTO gym_classes (
                title, description, class_date, start_time, duration_minutes,
                intensity, instructor, max_participants, status, workout
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CLASS_COLUMNS
        ))
        .bind(request.title.trim())
        .bind(clean_optional(request.description))
        .bind(request.class_date)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(request.intensity.unwrap_or(ClassIntensity::Medium))
        .bind(clean_optional(request.instructor))
        .bind(request.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS))
        .bind(request.status.unwrap_or(ClassStatus::Draft))
        .bind(Json(workout))
        .fetch_one(&self.db)
        .await?;

        info!("Created class {} on {}", class.id, class.class_date);
        self.changes.created(EntityKind::Class, class.id);
        Ok(class)
    }

    pub async fn update_class(
        &self,
        class_id: Uuid,
        request: UpdateClassRequest,
    ) -> Result<Option<GymClass>> {
        let class = sqlx::query_as::<_, GymClass>(&format!(
            r#"
            UPDATE gym_classes
            SET
                title = COALESCE($2, title),
                description = CASE WHEN $3::text IS NULL THEN description ELSE NULLIF($3, '') END,
                class_date = COALESCE($4, class_date),
                start_time = COALESCE($5, start_time),
                duration_minutes = COALESCE($6, duration_minutes),
                intensity = COALESCE($7, intensity),
                instructor = CASE WHEN $8::text IS NULL THEN instructor ELSE NULLIF($8, '') END,
                max_participants = COALESCE($9, max_participants),
                status = COALESCE($10, status),
                workout = COALESCE($11, workout),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CLASS_COLUMNS
        ))
        .bind(class_id)
        .bind(request.title.map(|t| t.trim().to_string()))
        .bind(trim_text(request.description))
        .bind(request.class_date)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(request.intensity)
        .bind(trim_text(request.instructor))
        .bind(request.max_participants)
        .bind(request.status)
        .bind(request.workout.map(Json))
        .fetch_optional(&self.db)
        .await?;

        if let Some(class) = &class {
            self.changes.updated(EntityKind::Class, class.id);
        }
        Ok(class)
    }

    pub async fn set_status(&self, class_id: Uuid, status: ClassStatus) -> Result<Option<GymClass>> {
        self.update_class(
            class_id,
            UpdateClassRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_class(&self, class_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gym_classes WHERE id = $1")
            .bind(class_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::Class, class_id);
        }
        Ok(deleted)
    }

    pub async fn counters(&self, today: NaiveDate) -> Result<ClassCounters> {
        let classes = self.list_classes(ClassFilter::default()).await?;
        Ok(ClassCounters::tally(&classes, today))
    }
}
