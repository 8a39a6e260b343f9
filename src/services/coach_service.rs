use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    clean_list, clean_optional, trim_text, Coach, CreateCoachRequest, UpdateCoachRequest,
};
use crate::services::change_feed::{ChangeBus, EntityKind};

const COACH_COLUMNS: &str = "id, name, title, specialties, bio, certifications, email, phone, \
    image_url, is_active, display_order, created_at, updated_at";

#[derive(Clone)]
pub struct CoachService {
    db: PgPool,
    changes: ChangeBus,
}

impl CoachService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn list_coaches(&self, include_inactive: bool) -> Result<Vec<Coach>> {
        let filter = if include_inactive { "" } else { "WHERE is_active = TRUE" };
        let coaches = sqlx::query_as::<_, Coach>(&format!(
            "SELECT {} FROM coaches {} ORDER BY display_order ASC, name ASC",
            COACH_COLUMNS, filter
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(coaches)
    }

    pub async fn get_coach(&self, coach_id: Uuid) -> Result<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>(&format!(
            "SELECT {} FROM coaches WHERE id = $1",
            COACH_COLUMNS
        ))
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(coach)
    }

    pub async fn create_coach(&self, request: CreateCoachRequest) -> Result<Coach> {
        let coach = sqlx::query_as::<_, Coach>(&format!(
            r#"
            INSERT INTO coaches (
                name, title, specialties, bio, certifications, email, phone,
                image_url, is_active, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            COACH_COLUMNS
        ))
        .bind(request.name.trim())
        .bind(clean_optional(request.title))
        .bind(clean_list(request.specialties))
        .bind(clean_optional(request.bio))
        .bind(clean_list(request.certifications))
        .bind(clean_optional(request.email))
        .bind(clean_optional(request.phone))
        .bind(clean_optional(request.image_url))
        .bind(request.is_active.unwrap_or(true))
        .bind(request.display_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        info!("Created coach {} ({})", coach.name, coach.id);
        self.changes.created(EntityKind::Coach, coach.id);
        Ok(coach)
    }

    pub async fn update_coach(
        &self,
        coach_id: Uuid,
        request: UpdateCoachRequest,
    ) -> Result<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>(&format!(
            r#"
            UPDATE coaches
            SET
                name = COALESCE($2, name),
                title = CASE WHEN $3::text IS NULL THEN title ELSE NULLIF($3, '') END,
                specialties = COALESCE($4, specialties),
                bio = CASE WHEN $5::text IS NULL THEN bio ELSE NULLIF($5, '') END,
                certifications = COALESCE($6, certifications),
                email = CASE WHEN $7::text IS NULL THEN email ELSE NULLIF($7, '') END,
                phone = CASE WHEN $8::text IS NULL THEN phone ELSE NULLIF($8, '') END,
                image_url = CASE WHEN $9::text IS NULL THEN image_url ELSE NULLIF($9, '') END,
                is_active = COALESCE($10, is_active),
                display_order = COALESCE($11, display_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COACH_COLUMNS
        ))
        .bind(coach_id)
        .bind(request.name.map(|n| n.trim().to_string()))
        .bind(trim_text(request.title))
        .bind(request.specialties.map(clean_list))
        .bind(trim_text(request.bio))
        .bind(request.certifications.map(clean_list))
        .bind(trim_text(request.email))
        .bind(trim_text(request.phone))
        .bind(trim_text(request.image_url))
        .bind(request.is_active)
        .bind(request.display_order)
        .fetch_optional(&self.db)
        .await?;

        if let Some(coach) = &coach {
            self.changes.updated(EntityKind::Coach, coach.id);
        }
        Ok(coach)
    }

    /// Flip the active flag in a single statement
    pub async fn toggle_active(&self, coach_id: Uuid) -> Result<Option<Coach>> {
        let coach = sqlx::query_as::<_, Coach>(&format!(
            "UPDATE coaches SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COACH_COLUMNS
        ))
        .bind(coach_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(coach) = &coach {
            info!("Coach {} is now {}", coach.id, if coach.is_active { "active" } else { "inactive" });
            self.changes.updated(EntityKind::Coach, coach.id);
        }
        Ok(coach)
    }

    pub async fn delete_coach(&self, coach_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM coaches WHERE id = $1")
            .bind(coach_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::Coach, coach_id);
        }
        Ok(deleted)
    }
}
