use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    clean_list, clean_optional, trim_text, CreateInquiryRequest, CreatePackageRequest,
    InquiryCounts, InquiryStatus, SponsorshipInquiry, SponsorshipPackage, UpdateInquiryRequest,
    UpdatePackageRequest,
};
use crate::services::change_feed::{ChangeBus, EntityKind};

const PACKAGE_COLUMNS: &str = "id, name, description, price, benefits, max_sponsors, is_active, \
    display_order, created_at, updated_at";

const INQUIRY_COLUMNS: &str = "id, company_name, contact_name, email, phone, package_id, message, \
    status, admin_notes, created_at, updated_at";

/// Sponsorship packages offered on the site and the inquiries they receive
#[derive(Clone)]
pub struct SponsorshipService {
    db: PgPool,
    changes: ChangeBus,
}

impl SponsorshipService {
    pub fn new(db: PgPool, changes: ChangeBus) -> Self {
        Self { db, changes }
    }

    // Packages

    pub async fn list_packages(&self, include_inactive: bool) -> Result<Vec<SponsorshipPackage>> {
        let filter = if include_inactive { "" } else { "WHERE is_active = TRUE" };
        let packages = sqlx::query_as::<_, SponsorshipPackage>(&format!(
            "SELECT {} FROM sponsorship_packages {} ORDER BY display_order ASC, price DESC",
            PACKAGE_COLUMNS, filter
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(packages)
    }

    pub async fn get_package(&self, package_id: Uuid) -> Result<Option<SponsorshipPackage>> {
        let package = sqlx::query_as::<_, SponsorshipPackage>(&format!(
            "SELECT {} FROM sponsorship_packages WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(package_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(package)
    }

    pub async fn create_package(&self, request: CreatePackageRequest) -> Result<SponsorshipPackage> {
        let package = sqlx::query_as::<_, SponsorshipPackage>(&format!(
            r#"
            INSERT INTO sponsorship_packages (
                name, description, price, benefits, max_sponsors, is_active, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(request.name.trim())
        .bind(clean_optional(request.description))
        .bind(request.price)
        .bind(clean_list(request.benefits))
        .bind(request.max_sponsors)
        .bind(request.is_active.unwrap_or(true))
        .bind(request.display_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        info!("Created sponsorship package {} ({})", package.name, package.id);
        self.changes.created(EntityKind::SponsorshipPackage, package.id);
        Ok(package)
    }

    pub async fn update_package(
        &self,
        package_id: Uuid,
        request: UpdatePackageRequest,
    ) -> Result<Option<SponsorshipPackage>> {
        let package = sqlx::query_as::<_, SponsorshipPackage>(&format!(
            r#"
            UPDATE sponsorship_packages
            SET
                name = COALESCE($2, name),
                description = CASE WHEN $3::text IS NULL THEN description ELSE NULLIF($3, '') END,
                price = COALESCE($4, price),
                benefits = COALESCE($5, benefits),
                max_sponsors = COALESCE($6, max_sponsors),
                is_active = COALESCE($7, is_active),
                display_order = COALESCE($8, display_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(package_id)
        .bind(request.name.map(|n| n.trim().to_string()))
        .bind(trim_text(request.description))
        .bind(request.price)
        .bind(request.benefits.map(clean_list))
        .bind(request.max_sponsors)
        .bind(request.is_active)
        .bind(request.display_order)
        .fetch_optional(&self.db)
        .await?;

        if let Some(package) = &package {
            self.changes.updated(EntityKind::SponsorshipPackage, package.id);
        }
        Ok(package)
    }

    pub async fn delete_package(&self, package_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsorship_packages WHERE id = $1")
            .bind(package_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::SponsorshipPackage, package_id);
        }
        Ok(deleted)
    }

    // Inquiries

    pub async fn list_inquiries(&self, status: Option<InquiryStatus>) -> Result<Vec<SponsorshipInquiry>> {
        let mut query = format!("SELECT {} FROM sponsorship_inquiries", INQUIRY_COLUMNS);
        if status.is_some() {
            query.push_str(" WHERE status = $1");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, SponsorshipInquiry>(&query);
        if let Some(status) = status {
            query_builder = query_builder.bind(status);
        }

        let inquiries = query_builder.fetch_all(&self.db).await?;
        Ok(inquiries)
    }

    pub async fn get_inquiry(&self, inquiry_id: Uuid) -> Result<Option<SponsorshipInquiry>> {
        let inquiry = sqlx::query_as::<_, SponsorshipInquiry>(&format!(
            "SELECT {} FROM sponsorship_inquiries WHERE id = $1",
            INQUIRY_COLUMNS
        ))
        .bind(inquiry_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(inquiry)
    }

    /// Store a public inquiry as pending. The caller checks the package first.
    pub async fn create_inquiry(&self, request: CreateInquiryRequest) -> Result<SponsorshipInquiry> {
        let inquiry = sqlx::query_as::<_, SponsorshipInquiry>(&format!(
            r#"
            INSERT INTO sponsorship_inquiries (
                company_name, contact_name, email, phone, package_id, message, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {}
            "#,
            INQUIRY_COLUMNS
        ))
        .bind(request.company_name.trim())
        .bind(request.contact_name.trim())
        .bind(request.email.trim().to_lowercase())
        .bind(clean_optional(request.phone))
        .bind(request.package_id)
        .bind(clean_optional(request.message))
        .fetch_one(&self.db)
        .await?;

        info!("New sponsorship inquiry {} from {}", inquiry.id, inquiry.company_name);
        self.changes.created(EntityKind::SponsorshipInquiry, inquiry.id);
        Ok(inquiry)
    }

    pub async fn update_inquiry(
        &self,
        inquiry_id: Uuid,
        request: UpdateInquiryRequest,
    ) -> Result<Option<SponsorshipInquiry>> {
        let inquiry = sqlx::query_as::<_, SponsorshipInquiry>(&format!(
            r#"
            UPDATE sponsorship_inquiries
            SET
                status = COALESCE($2, status),
                admin_notes = CASE WHEN $3::text IS NULL THEN admin_notes ELSE NULLIF($3, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            INQUIRY_COLUMNS
        ))
        .bind(inquiry_id)
        .bind(request.status)
        .bind(trim_text(request.admin_notes))
        .fetch_optional(&self.db)
        .await?;

        if let Some(inquiry) = &inquiry {
            self.changes.updated(EntityKind::SponsorshipInquiry, inquiry.id);
        }
        Ok(inquiry)
    }

    pub async fn delete_inquiry(&self, inquiry_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sponsorship_inquiries WHERE id = $1")
            .bind(inquiry_id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.changes.deleted(EntityKind::SponsorshipInquiry, inquiry_id);
        }
        Ok(deleted)
    }

    pub async fn inquiry_counts(&self) -> Result<InquiryCounts> {
        let rows: Vec<(InquiryStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM sponsorship_inquiries GROUP BY status",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(InquiryCounts::from_rows(&rows))
    }
}
