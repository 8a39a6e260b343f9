use serde::{Deserialize, Serialize};

/// Structured workout attached to a class: a sequence of rounds, each a list
/// of exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutBreakdown {
    #[serde(default)]
    pub format: Option<String>, // "For Time", "AMRAP", "EMOM", ...
    #[serde(default)]
    pub time_cap_minutes: Option<u32>,
    #[serde(default)]
    pub rounds: Vec<WorkoutRound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRound {
    pub name: String,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub rest_seconds: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub distance_meters: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Exercise {
    pub fn reps(name: &str, reps: u32) -> Self {
        Self {
            name: name.to_string(),
            reps: Some(reps),
            ..Default::default()
        }
    }

    pub fn distance(name: &str, meters: u32) -> Self {
        Self {
            name: name.to_string(),
            distance_meters: Some(meters),
            ..Default::default()
        }
    }

    pub fn timed(name: &str, seconds: u32) -> Self {
        Self {
            name: name.to_string(),
            duration_seconds: Some(seconds),
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: &str) -> Self {
        self.weight = Some(weight.to_string());
        self
    }

    /// One-line description such as `1km Run`, `20 Wall Balls @ 9kg` or `1:30 Plank`
    pub fn describe(&self) -> String {
        let mut line = String::new();

        if let Some(reps) = self.reps {
            line.push_str(&format!("{} ", reps));
        }
        if let Some(meters) = self.distance_meters {
            line.push_str(&format_distance(meters));
            line.push(' ');
        }
        if let Some(seconds) = self.duration_seconds {
            line.push_str(&format_duration(seconds));
            line.push(' ');
        }

        line.push_str(self.name.trim());

        if let Some(weight) = self.weight.as_deref().filter(|w| !w.trim().is_empty()) {
            line.push_str(&format!(" @ {}", weight.trim()));
        }
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            line.push_str(&format!(" ({})", notes.trim()));
        }

        line
    }
}

fn format_distance(meters: u32) -> String {
    if meters >= 1000 && meters % 1000 == 0 {
        format!("{}km", meters / 1000)
    } else {
        format!("{}m", meters)
    }
}

fn format_duration(seconds: u32) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}

/// Totals shown next to a workout in the class editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub rounds: u64,
    pub total_exercises: u64,
    pub total_reps: u64,
    pub total_distance_meters: u64,
}

impl WorkoutBreakdown {
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Render the plain-text preview displayed on the schedule and in the editor
    pub fn render_preview(&self) -> String {
        let mut lines = Vec::new();

        let header = match (self.format.as_deref().map(str::trim), self.time_cap_minutes) {
            (Some(format), Some(cap)) if !format.is_empty() => format!("{} (cap {} min)", format, cap),
            (Some(format), None) if !format.is_empty() => format.to_string(),
            (_, Some(cap)) => format!("Time cap {} min", cap),
            _ => String::new(),
        };
        if !header.is_empty() {
            lines.push(header);
        }

        for round in &self.rounds {
            let mut title = round.name.trim().to_string();
            if round.repeat > 1 {
                title.push_str(&format!(" x{}", round.repeat));
            }
            if let Some(rest) = round.rest_seconds.filter(|r| *r > 0) {
                title.push_str(&format!(" (rest {}s)", rest));
            }
            lines.push(title);

            for exercise in &round.exercises {
                lines.push(format!("  - {}", exercise.describe()));
            }
        }

        lines.join("\n")
    }

    /// Count rounds and volume, multiplying by each round's repeat
    pub fn stats(&self) -> WorkoutStats {
        self.rounds.iter().fold(WorkoutStats::default(), |mut stats, round| {
            let repeat = u64::from(round.repeat.max(1));
            let reps: u64 = round.exercises.iter().filter_map(|e| e.reps).map(u64::from).sum();
            let distance: u64 = round
                .exercises
                .iter()
                .filter_map(|e| e.distance_meters)
                .map(u64::from)
                .sum();

            stats.rounds = stats.rounds.saturating_add(repeat);
            stats.total_exercises = stats
                .total_exercises
                .saturating_add((round.exercises.len() as u64).saturating_mul(repeat));
            stats.total_reps = stats.total_reps.saturating_add(reps.saturating_mul(repeat));
            stats.total_distance_meters = stats
                .total_distance_meters
                .saturating_add(distance.saturating_mul(repeat));
            stats
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(cap) = self.time_cap_minutes {
            check_limit(cap, 1, MAX_TIME_CAP_MINUTES, "Time cap (minutes)")?;
        }
        if self.rounds.len() > MAX_ROUNDS {
            anyhow::bail!("A workout cannot have more than {} rounds", MAX_ROUNDS);
        }

        for (index, round) in self.rounds.iter().enumerate() {
            let position = index + 1;
            if round.repeat == 0 {
                anyhow::bail!("Round {} must repeat at least once", position);
            }
            check_limit(round.repeat, 1, MAX_REPEAT, &format!("Round {} repeat", position))?;
            if let Some(rest) = round.rest_seconds {
                check_limit(rest, 0, MAX_REST_SECONDS, &format!("Round {} rest (seconds)", position))?;
            }
            if round.exercises.is_empty() {
                anyhow::bail!("Round {} must contain at least one exercise", position);
            }
            if round.exercises.len() > MAX_EXERCISES_PER_ROUND {
                anyhow::bail!(
                    "Round {} cannot have more than {} exercises",
                    position,
                    MAX_EXERCISES_PER_ROUND
                );
            }
            for exercise in &round.exercises {
                if exercise.name.trim().is_empty() {
                    anyhow::bail!("Every exercise in round {} needs a name", position);
                }
                if let Some(reps) = exercise.reps {
                    check_limit(reps, 0, MAX_REPS, "Reps")?;
                }
                if let Some(meters) = exercise.distance_meters {
                    check_limit(meters, 0, MAX_DISTANCE_METERS, "Distance (meters)")?;
                }
                if let Some(seconds) = exercise.duration_seconds {
                    check_limit(seconds, 0, MAX_DURATION_SECONDS, "Duration (seconds)")?;
                }
            }
        }
        Ok(())
    }
}

const MAX_TIME_CAP_MINUTES: u32 = 600;
const MAX_ROUNDS: usize = 50;
const MAX_REPEAT: u32 = 100;
const MAX_REST_SECONDS: u32 = 3600;
const MAX_EXERCISES_PER_ROUND: usize = 50;
const MAX_REPS: u32 = 10_000;
const MAX_DISTANCE_METERS: u32 = 100_000;
const MAX_DURATION_SECONDS: u32 = 24 * 60 * 60;

fn check_limit(value: u32, min: u32, max: u32, field_name: &str) -> anyhow::Result<()> {
    if value < min || value > max {
        anyhow::bail!("{} must be between {} and {}", field_name, min, max);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WorkoutPreview {
    pub preview: String,
    pub stats: WorkoutStats,
}

impl From<&WorkoutBreakdown> for WorkoutPreview {
    fn from(breakdown: &WorkoutBreakdown) -> Self {
        Self {
            preview: breakdown.render_preview(),
            stats: breakdown.stats(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkoutPreviewRequest {
    pub workout: WorkoutBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> WorkoutBreakdown {
        WorkoutBreakdown {
            format: Some("For Time".into()),
            time_cap_minutes: Some(45),
            rounds: vec![
                WorkoutRound {
                    name: "Warm-up".into(),
                    repeat: 1,
                    rest_seconds: None,
                    exercises: vec![Exercise::timed("Plank", 90), Exercise::timed("Jumping Jacks", 45)],
                },
                WorkoutRound {
                    name: "Engine".into(),
                    repeat: 3,
                    rest_seconds: Some(60),
                    exercises: vec![
                        Exercise::distance("Run", 1000),
                        Exercise::reps("Wall Balls", 20).with_weight("9kg"),
                        Exercise::distance("Row", 500),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_render_preview() {
        let expected = "For Time (cap 45 min)\n\
                        Warm-up\n  - 1:30 Plank\n  - 45s Jumping Jacks\n\
                        Engine x3 (rest 60s)\n  - 1km Run\n  - 20 Wall Balls @ 9kg\n  - 500m Row";
        assert_eq!(sample().render_preview(), expected);
    }

    #[test]
    fn test_stats_count_repeats() {
        let stats = sample().stats();
        assert_eq!(
            stats,
            WorkoutStats {
                rounds: 4,
                total_exercises: 11,
                total_reps: 60,
                total_distance_meters: 4500,
            }
        );
    }

    #[test]
    fn test_exercise_notes_and_blank_weight() {
        let exercise = Exercise {
            name: "Sled Push".into(),
            distance_meters: Some(50),
            weight: Some("  ".into()),
            notes: Some("break into 2x25m".into()),
            ..Default::default()
        };
        assert_eq!(exercise.describe(), "50m Sled Push (break into 2x25m)");
    }

    #[test]
    fn test_empty_breakdown() {
        let breakdown = WorkoutBreakdown::default();
        assert!(breakdown.is_empty());
        assert_eq!(breakdown.render_preview(), "");
        assert_eq!(breakdown.stats(), WorkoutStats::default());
        assert!(breakdown.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_round() {
        let mut breakdown = sample();
        breakdown.rounds[0].exercises.clear();
        assert!(breakdown.validate().is_err());

        let mut breakdown = sample();
        breakdown.rounds[1].repeat = 0;
        assert!(breakdown.validate().is_err());
    }

    #[test]
    fn test_validation_limits_repeat_and_timings() {
        let huge: WorkoutBreakdown = serde_json::from_str(
            r#"{"rounds":[{"name":"Big","repeat":4294967295,"exercises":[{"name":"Burpees","reps":2}]}]}"#,
        )
        .unwrap();
        assert!(huge.validate().is_err());

        let mut breakdown = sample();
        breakdown.rounds[1].repeat = 100;
        assert!(breakdown.validate().is_ok());
        breakdown.rounds[1].repeat = 101;
        assert!(breakdown.validate().is_err());

        let mut breakdown = sample();
        breakdown.time_cap_minutes = Some(0);
        assert!(breakdown.validate().is_err());

        let mut breakdown = sample();
        breakdown.rounds[1].rest_seconds = Some(3601);
        assert!(breakdown.validate().is_err());
    }

    #[test]
    fn test_stats_do_not_overflow() {
        let huge: WorkoutBreakdown = serde_json::from_str(
            r#"{"rounds":[
                {"name":"Big","repeat":4294967295,"exercises":[{"name":"Burpees","reps":2}]},
                {"name":"Bigger","repeat":4294967295,"exercises":[{"name":"Run","distance_meters":4294967295}]}
            ]}"#,
        )
        .unwrap();

        let stats = huge.stats();
        assert_eq!(stats.rounds, 2 * u64::from(u32::MAX));
        assert_eq!(stats.total_reps, 2 * u64::from(u32::MAX));
        assert_eq!(stats.total_distance_meters, u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn test_round_repeat_defaults_to_one() {
        let round: WorkoutRound =
            serde_json::from_str(r#"{"name": "Finisher", "exercises": [{"name": "Burpees", "reps": 30}]}"#).unwrap();
        assert_eq!(round.repeat, 1);
    }
}
