use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{clean_optional, trim_text, CreateSponsorRequest, Sponsor, UpdateSponsorRequest};
use crate::services::change_feed::{ChangeBus, EntityKind};

const SPONSOR_COLUMNS: &str = "id, name, logo_url, website_url, description, contact_email, \
    is_active, display_order, created_at, updated_at";

#[derive(Clone)]
pub struct SponsorService {
    db: PgPool,
    changes: ChangeBus,
}

impl SponsorService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    pub async fn list_sponsors(&self, include_inactive: bool) -> Result<Vec<Sponsor>> {
        let filter = if include_inactive { "" } else { "WHERE is_active = TRUE" };
        let sponsors = sqlx::query_as::<_, Sponsor>(&format!(
            "SELECT {} FROM sponsors {} ORDER BY display_order ASC, name ASC",
            SPONSOR_COLUMNS, filter
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(sponsors)
    }

    pub async fn get_sponsor(&self, sponsor_id: Uuid) -> Result<Option<Sponsor>> {
        let sponsor = sqlx::query_as::<_, Sponsor>(&format!(
            "SELECT {} FROM sponsors WHERE id = $1",
            SPONSOR_COLUMNS
        ))
        .bind(sponsor_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(sponsor)
    }

    pub async fn sponsor_exists(&self, sponsor_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sponsors WHERE id = $1)")
            .bind(sponsor_id)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }

    pub async fn create_sponsor(&self, request: CreateSponsorRequest) -> Result<Sponsor> {
        let sponsor = sqlx::query_as::<_, Sponsor>(&format!(
            r#"
            INSERT INTO sponsors (
                name, logo_url, website_url, description, contact_email, is_active, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SPONSOR_COLUMNS
        ))
        .bind(request.name.trim())
        .bind(clean_optional(request.logo_url))
        .bind(clean_optional(request.website_url))
        .bind(clean_optional(request.description))
        .bind(clean_optional(request.contact_email))
        .bind(request.is_active.unwrap_or(true))
        .bind(request.display_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        info!("Created sponsor {} ({})", sponsor.name, sponsor.id);
        self.changes.created(EntityKind::Sponsor, sponsor.id);
        Ok(sponsor)
    }

    pub async fn update_sponsor(
        &self,
        sponsor_id: Uuid,
        request: UpdateSponsorRequest,
    ) -> Result<Option<Sponsor>> {
        let sponsor = sqlx::query_as::<_, Sponsor>(&format!(
            r#"
            UPDATE sponsors
            SET
                name = COALESCE($2, name),
                logo_url = CASE WHEN $3::text IS NULL THEN logo_url ELSE NULLIF($3, '') END,
                website_url = CASE WHEN $4::text IS NULL THEN website_url ELSE NULLIF($4, '') END,
                description = CASE WHEN $5::text IS NULL THEN description ELSE NULLIF($5, '') END,
                contact_email = CASE WHEN $6::text IS NULL THEN contact_email ELSE NULLIF($6, '') END,
                is_active = COALESCE($7, is_active),
                display_order = COALESCE($8, display_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SPONSOR_COLUMNS
        ))
        .bind(sponsor_id)
        .bind(request.name.map(|n| n.trim().to_string()))
        .bind(trim_text(request.logo_url))
        .bind(trim_text(request.website_url))
        .bind(trim_text(request.description))
        .bind(trim_text(request.contact_email))
        .bind(request.is_active)
        .bind(request.display_order)
        .fetch_optional(&self.db)
        .await?;

        if let Some(sponsor) = &sponsor {
            self.changes.updated(EntityKind::Sponsor, sponsor.id);
        }
        Ok(sponsor)
    }

    pub async fn toggle_active(&self, sponsor_id: Uuid) -> Result<Option<Sponsor>> {
        let sponsor = sqlx::query_as::<_, Sponsor>(&format!(
            "UPDATE sponsors SET is_active = NOT is_active, updated_at = NOW() WHERE id = $1 RETURNING {}",
            SPONSOR_COLUMNS
        ))
        .bind(sponsor_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(sponsor) = &sponsor {
            self.changes.updated(EntityKind::Sponsor, sponsor.id);
        }
        Ok(sponsor)
    }

    /// Events keep their row; the FK clears their sponsor_id
    pub async fn delete_sponsor(&self, sponsor_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsors WHERE id = $1")
            .bind(sponsor_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::Sponsor, sponsor_id);
        }
        Ok(deleted)
    }
}
