use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::validation::{validate_email, validate_required_text, validate_url};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sponsor {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSponsorRequest {
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSponsorRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

fn validate_links(website_url: Option<&str>, contact_email: Option<&str>) -> anyhow::Result<()> {
    if let Some(url) = website_url.map(str::trim).filter(|u| !u.is_empty()) {
        validate_url(url, "Website URL")?;
    }
    if let Some(email) = contact_email.map(str::trim).filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

impl CreateSponsorRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.name, "Name", 120)?;
        validate_links(self.website_url.as_deref(), self.contact_email.as_deref())
    }
}

impl UpdateSponsorRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name {
            validate_required_text(name, "Name", 120)?;
        }
        validate_links(self.website_url.as_deref(), self.contact_email.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct SponsorQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
