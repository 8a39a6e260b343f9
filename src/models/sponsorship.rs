use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::validation::{validate_email, validate_price, validate_required_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SponsorshipPackage {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub benefits: Vec<String>,
    pub max_sponsors: Option<i32>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackageRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub max_sponsors: Option<i32>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub benefits: Option<Vec<String>>,
    pub max_sponsors: Option<i32>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

fn validate_max_sponsors(max_sponsors: Option<i32>) -> anyhow::Result<()> {
    if matches!(max_sponsors, Some(max) if max < 1) {
        anyhow::bail!("Max sponsors must be at least 1");
    }
    Ok(())
}

impl CreatePackageRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.name, "Name", 120)?;
        validate_price(self.price, "Price")?;
        validate_max_sponsors(self.max_sponsors)
    }
}

impl UpdatePackageRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name {
            validate_required_text(name, "Name", 120)?;
        }
        if let Some(price) = self.price {
            validate_price(price, "Price")?;
        }
        validate_max_sponsors(self.max_sponsors)
    }
}

#[derive(Debug, Deserialize)]
pub struct PackageQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SponsorshipInquiry {
    pub id: Uuid,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub package_id: Option<Uuid>,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "inquiry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    Pending,
    Contacted,
    Approved,
    Rejected,
}

/// Public sponsorship contact form
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInquiryRequest {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub package_id: Option<Uuid>,
    pub message: Option<String>,
}

impl CreateInquiryRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.company_name, "Company name", 200)?;
        validate_required_text(&self.contact_name, "Contact name", 200)?;
        validate_email(self.email.trim())?;
        if let Some(message) = &self.message {
            if message.chars().count() > 5000 {
                anyhow::bail!("Message cannot be longer than 5000 characters");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: Option<InquiryStatus>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InquiryQuery {
    pub status: Option<InquiryStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InquiryCounts {
    pub total: i64,
    pub pending: i64,
    pub contacted: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl InquiryCounts {
    /// Build from `(status, count)` rows as returned by a GROUP BY
    pub fn from_rows(rows: &[(InquiryStatus, i64)]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, (status, n)| {
            counts.total += n;
            match status {
                InquiryStatus::Pending => counts.pending += n,
                InquiryStatus::Contacted => counts.contacted += n,
                InquiryStatus::Approved => counts.approved += n,
                InquiryStatus::Rejected => counts.rejected += n,
            }
            counts
        })
    }
}
