use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::models::validation::{validate_range, validate_required_text};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub current_week: i32,
    pub total_weeks: i32,
    pub phases: Json<Vec<ProgramPhase>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named block of weeks within a program. Week ranges and status are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPhase {
    pub name: String,
    pub weeks: i32,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub start_week: i32,
    #[serde(default)]
    pub end_week: i32,
    #[serde(default)]
    pub status: PhaseStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Current,
    #[default]
    Upcoming,
}

/// Phase input as sent by the program editor
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseInput {
    pub name: String,
    pub weeks: i32,
    pub focus: Option<String>,
}

impl From<PhaseInput> for ProgramPhase {
    fn from(input: PhaseInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
            weeks: input.weeks,
            focus: input.focus,
            start_week: 0,
            end_week: 0,
            status: PhaseStatus::Upcoming,
        }
    }
}

/// Result of laying out phases against a calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSchedule {
    pub phases: Vec<ProgramPhase>,
    pub total_weeks: i32,
    pub current_week: i32,
}

/// Week number (1-based) that `today` falls into for a program starting on
/// `start_date`, clamped to the program length.
pub fn week_of_program(start_date: NaiveDate, today: NaiveDate, total_weeks: i32) -> i32 {
    let days = (today - start_date).num_days();
    let week = if days < 0 { 1 } else { (days / 7) as i32 + 1 };
    week.clamp(1, total_weeks.max(1))
}

/// Lay phases end to end from week 1, then mark each completed, current or
/// upcoming relative to today's week. Once the program has run past its last
/// week every phase is completed.
pub fn recalculate_phases(
    phases: &[ProgramPhase],
    start_date: NaiveDate,
    fallback_total_weeks: i32,
    today: NaiveDate,
) -> PhaseSchedule {
    let total_weeks = if phases.is_empty() {
        fallback_total_weeks.max(1)
    } else {
        phases.iter().map(|p| p.weeks.max(1)).sum()
    };

    let elapsed_days = (today - start_date).num_days();
    let finished = elapsed_days >= 0 && (elapsed_days / 7) as i32 >= total_weeks;
    let current_week = week_of_program(start_date, today, total_weeks);

    let mut next_start = 1;
    let phases = phases
        .iter()
        .map(|phase| {
            let weeks = phase.weeks.max(1);
            let start_week = next_start;
            let end_week = start_week + weeks - 1;
            next_start = end_week + 1;

            let status = if finished || end_week < current_week {
                PhaseStatus::Completed
            } else if start_week <= current_week {
                PhaseStatus::Current
            } else {
                PhaseStatus::Upcoming
            };

            ProgramPhase {
                name: phase.name.clone(),
                weeks,
                focus: phase.focus.clone(),
                start_week,
                end_week,
                status,
            }
        })
        .collect();

    PhaseSchedule {
        phases,
        total_weeks,
        current_week,
    }
}

impl Program {
    /// Recompute derived week fields against `today` without touching storage
    pub fn refreshed(mut self, today: NaiveDate) -> Self {
        let schedule = recalculate_phases(&self.phases.0, self.start_date, self.total_weeks, today);
        self.phases = Json(schedule.phases);
        self.total_weeks = schedule.total_weeks;
        self.current_week = schedule.current_week;
        self
    }

    pub fn current_phase(&self) -> Option<&ProgramPhase> {
        self.phases.0.iter().find(|p| p.status == PhaseStatus::Current)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgramRequest {
    pub name: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub total_weeks: Option<i32>,
    #[serde(default)]
    pub phases: Vec<PhaseInput>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProgramRequest {
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub total_weeks: Option<i32>,
    pub phases: Option<Vec<PhaseInput>>,
    pub is_active: Option<bool>,
}

fn validate_phases(phases: &[PhaseInput]) -> anyhow::Result<()> {
    for phase in phases {
        validate_required_text(&phase.name, "Phase name", 80)?;
        validate_range(phase.weeks, 1, 104, "Phase weeks")?;
    }
    Ok(())
}

impl CreateProgramRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_required_text(&self.name, "Name", 120)?;
        if let Some(total) = self.total_weeks {
            validate_range(total, 1, 104, "Total weeks")?;
        }
        validate_phases(&self.phases)
    }
}

impl UpdateProgramRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(name) = &self.name {
            validate_required_text(name, "Name", 120)?;
        }
        if let Some(total) = self.total_weeks {
            validate_range(total, 1, 104, "Total weeks")?;
        }
        if let Some(phases) = &self.phases {
            validate_phases(phases)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramResponse {
    #[serde(flatten)]
    pub program: Program,
    pub current_phase: Option<ProgramPhase>,
}

impl From<Program> for ProgramResponse {
    fn from(program: Program) -> Self {
        let current_phase = program.current_phase().cloned();
        Self {
            program,
            current_phase,
        }
    }
}
