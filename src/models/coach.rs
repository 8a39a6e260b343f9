use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::validation::{validate_email, validate_required_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coach {
    pub id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub specialties: Vec<String>,
    pub bio: Option<String>,
    pub certifications: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoachRequest {
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCoachRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub bio: Option<String>,
    pub certifications: Option<Vec<String>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

impl CreateCoachRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.name, "Name", 120)?;
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            validate_email(email)?;
        }
        Ok(())
    }
}

impl UpdateCoachRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name {
            validate_required_text(name, "Name", 120)?;
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CoachQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
