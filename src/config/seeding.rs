use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveTime};
use sqlx::PgPool;

use crate::auth::AuthService;
use crate::models::*;
use crate::services::*;

/// Startup data: the bootstrap admin and optional demo content
pub struct DatabaseSeeder {
    pool: PgPool,
    changes: ChangeBus,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool, changes: ChangeBus) -> Self {
        Self { pool, changes }
    }

    /// Create the admin account from configuration if it is missing
    pub async fn seed_admin(&self, auth: &AuthService, email: &str, password: &str) -> Result<()> {
        match auth.ensure_admin(email, password).await {
            Ok(true) => tracing::info!("Created bootstrap admin {}", email),
            Ok(false) => tracing::debug!("Bootstrap admin {} already exists", email),
            Err(e) => tracing::warn!("Could not create bootstrap admin {}: {}", email, e),
        }
        Ok(())
    }

    /// Demo content for a fresh development database. Skipped when any coach exists.
    pub async fn seed_demo_content(&self) -> Result<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coaches")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            tracing::info!("Demo content already present, skipping");
            return Ok(());
        }

        tracing::info!("Starting database seeding...");

        self.seed_coaches().await?;
        self.seed_classes().await?;
        self.seed_program().await?;
        self.seed_sponsorship().await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_coaches(&self) -> Result<()> {
        let coach_service = CoachService::new(self.pool.clone(), self.changes.clone());

        let coaches = vec![
            ("Alex Rivera", "Head Coach", vec!["HYROX", "Engine"], 1),
            ("Sam Okafor", "Strength Coach", vec!["Strength", "Olympic Lifting"], 2),
            ("Mia Chen", "Mobility Coach", vec!["Mobility", "Recovery"], 3),
        ];

        for (name, title, specialties, order) in coaches {
            coach_service
                .create_coach(CreateCoachRequest {
                    name: name.to_string(),
                    title: Some(title.to_string()),
                    specialties: specialties.into_iter().map(String::from).collect(),
                    bio: None,
                    certifications: vec![],
                    email: None,
                    phone: None,
                    image_url: None,
                    is_active: Some(true),
                    display_order: Some(order),
                })
                .await?;
        }

        Ok(())
    }

    async fn seed_classes(&self) -> Result<()> {
        let class_service = ClassService::new(self.pool.clone(), self.changes.clone());
        let today = Local::now().date_naive();
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

        let schedule = [
            (0, "HYROX Simulation", "hyrox-simulation", ClassIntensity::Extreme),
            (2, "Engine Builder", "engine-builder", ClassIntensity::High),
            (4, "Stations EMOM", "hyrox-stations-emom", ClassIntensity::High),
            (5, "HYROX Half", "hyrox-half", ClassIntensity::Medium),
        ];

        let start_time = NaiveTime::from_hms_opt(18, 0, 0).context("invalid class start time")?;

        for (offset, title, template, intensity) in schedule {
            let Some(workout) = WorkoutTemplateService::workout_for(template) else {
                continue;
            };
            class_service
                .create_class(
                    CreateClassRequest {
                        title: title.to_string(),
                        description: None,
                        class_date: monday + Duration::days(offset),
                        start_time,
                        duration_minutes: 60,
                        intensity: Some(intensity),
                        instructor: Some("Alex Rivera".to_string()),
                        max_participants: Some(16),
                        status: Some(ClassStatus::Approved),
                        workout: None,
                        template: Some(template.to_string()),
                    },
                    workout,
                )
                .await?;
        }

        Ok(())
    }

    async fn seed_program(&self) -> Result<()> {
        let program_service = ProgramService::new(self.pool.clone(), self.changes.clone());
        let today = Local::now().date_naive();

        let phases = [
            ("Base", 4, "Aerobic base"),
            ("Build", 4, "Threshold"),
            ("Peak", 3, "Race pace"),
            ("Taper", 1, "Freshen up"),
        ]
        .into_iter()
        .map(|(name, weeks, focus)| PhaseInput {
            name: name.to_string(),
            weeks,
            focus: Some(focus.to_string()),
        })
        .collect();

        program_service
            .create_program(
                CreateProgramRequest {
                    name: "HYROX Race Prep".to_string(),
                    subtitle: Some("12-week block".to_string()),
                    description: None,
                    start_date: today - Duration::weeks(5),
                    total_weeks: None,
                    phases,
                    is_active: Some(true),
                },
                today,
            )
            .await?;

        Ok(())
    }

    async fn seed_sponsorship(&self) -> Result<()> {
        let sponsorship_service = SponsorshipService::new(self.pool.clone(), self.changes.clone());

        let packages = [
            ("Community", 500.0, vec!["Logo on website"], None, 1),
            ("Gold", 2500.0, vec!["Logo on website", "Banner at events", "Event naming"], Some(3), 2),
        ];

        for (name, price, benefits, max_sponsors, order) in packages {
            sponsorship_service
                .create_package(CreatePackageRequest {
                    name: name.to_string(),
                    description: None,
                    price,
                    benefits: benefits.into_iter().map(String::from).collect(),
                    max_sponsors,
                    is_active: Some(true),
                    display_order: Some(order),
                })
                .await?;
        }

        Ok(())
    }
}
