use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use uuid::Uuid;

use crate::models::validation::{validate_range, validate_required_text};
use crate::models::workout::{WorkoutBreakdown, WorkoutPreview};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GymClass {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub class_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub intensity: ClassIntensity,
    pub instructor: Option<String>,
    pub max_participants: i32,
    pub status: ClassStatus,
    pub workout: Json<WorkoutBreakdown>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "class_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    Draft,
    Approved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "class_intensity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClassIntensity {
    Low,
    Medium,
    High,
    Extreme,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub title: String,
    pub description: Option<String>,
    pub class_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub intensity: Option<ClassIntensity>,
    pub instructor: Option<String>,
    pub max_participants: Option<i32>,
    pub status: Option<ClassStatus>,
    pub workout: Option<WorkoutBreakdown>,
    /// Built-in workout template key, used when no workout is given
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClassRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub class_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub intensity: Option<ClassIntensity>,
    pub instructor: Option<String>,
    pub max_participants: Option<i32>,
    pub status: Option<ClassStatus>,
    pub workout: Option<WorkoutBreakdown>,
}

pub const DEFAULT_MAX_PARTICIPANTS: i32 = 20;

fn validate_class_fields(
    title: Option<&str>,
    duration_minutes: Option<i32>,
    max_participants: Option<i32>,
    workout: Option<&WorkoutBreakdown>,
) -> anyhow::Result<()> {
    if let Some(title) = title {
        validate_required_text(title, "Title", 200)?;
    }
    if let Some(duration) = duration_minutes {
        validate_range(duration, 1, 600, "Duration (minutes)")?;
    }
    if let Some(max) = max_participants {
        validate_range(max, 1, 500, "Max participants")?;
    }
    if let Some(workout) = workout {
        workout.validate()?;
    }
    Ok(())
}

impl CreateClassRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_class_fields(
            Some(&self.title),
            Some(self.duration_minutes),
            self.max_participants,
            self.workout.as_ref(),
        )
    }
}

impl UpdateClassRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_class_fields(
            self.title.as_deref(),
            self.duration_minutes,
            self.max_participants,
            self.workout.as_ref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassQuery {
    pub status: Option<ClassStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Class with its rendered workout preview, as returned by the detail route
#[derive(Debug, Serialize)]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: GymClass,
    pub workout_preview: WorkoutPreview,
}

impl From<GymClass> for ClassDetail {
    fn from(class: GymClass) -> Self {
        let workout_preview = WorkoutPreview::from(&class.workout.0);
        Self {
            class,
            workout_preview,
        }
    }
}

/// Class counters shown on the back-office dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounters {
    pub total: u32,
    pub draft: u32,
    pub approved: u32,
    pub cancelled: u32,
    /// Approved classes dated today or later
    pub upcoming: u32,
    /// Approved classes in the Monday-to-Sunday week containing today
    pub this_week: u32,
}

impl ClassCounters {
    pub fn tally(classes: &[GymClass], today: NaiveDate) -> Self {
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_end = week_start + Duration::days(6);

        classes.iter().fold(Self::default(), |mut counters, class| {
            counters.total += 1;
            match class.status {
                ClassStatus::Draft => counters.draft += 1,
                ClassStatus::Cancelled => counters.cancelled += 1,
                ClassStatus::Approved => {
                    counters.approved += 1;
                    if class.class_date >= today {
                        counters.upcoming += 1;
                    }
                    if class.class_date >= week_start && class.class_date <= week_end {
                        counters.this_week += 1;
                    }
                }
            }
            counters
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_on(date: NaiveDate, status: ClassStatus) -> GymClass {
        GymClass {
            id: Uuid::new_v4(),
            title: "HYROX Engine".into(),
            description: None,
            class_date: date,
            start_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            duration_minutes: 60,
            intensity: ClassIntensity::High,
            instructor: Some("Sam".into()),
            max_participants: 16,
            status,
            workout: Json(WorkoutBreakdown::default()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_class_counters() {
        // Wednesday
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        let next_week = NaiveDate::from_ymd_opt(2024, 6, 18).unwrap();

        let classes = vec![
            class_on(monday, ClassStatus::Approved),
            class_on(today, ClassStatus::Approved),
            class_on(sunday, ClassStatus::Approved),
            class_on(next_week, ClassStatus::Approved),
            class_on(next_week, ClassStatus::Draft),
            class_on(today, ClassStatus::Cancelled),
        ];

        let counters = ClassCounters::tally(&classes, today);
        assert_eq!(
            counters,
            ClassCounters {
                total: 6,
                draft: 1,
                approved: 4,
                cancelled: 1,
                upcoming: 3,
                this_week: 3,
            }
        );
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateClassRequest = serde_json::from_value(serde_json::json!({
            "title": "Sled Day",
            "class_date": "2024-06-12",
            "start_time": "18:00:00",
            "duration_minutes": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request = CreateClassRequest {
            duration_minutes: 45,
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_validation_only_checks_present_fields() {
        assert!(UpdateClassRequest::default().validate().is_ok());

        let update = UpdateClassRequest {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&ClassStatus::Approved).unwrap(), "\"approved\"");
        assert_eq!(
            serde_json::from_str::<ClassIntensity>("\"extreme\"").unwrap(),
            ClassIntensity::Extreme
        );
    }
}
