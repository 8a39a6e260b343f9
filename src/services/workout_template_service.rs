use serde::Serialize;

use crate::models::{Exercise, WorkoutBreakdown, WorkoutRound};

/// Built-in workout a class can be created from
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub workout: WorkoutBreakdown,
}

/// The eight HYROX stations in race order, at full race volume
fn hyrox_stations() -> Vec<Exercise> {
    vec![
        Exercise::distance("SkiErg", 1000),
        Exercise::distance("Sled Push", 50),
        Exercise::distance("Sled Pull", 50),
        Exercise::distance("Burpee Broad Jumps", 80),
        Exercise::distance("Row", 1000),
        Exercise::distance("Farmers Carry", 200),
        Exercise::distance("Sandbag Lunges", 100),
        Exercise::reps("Wall Balls", 100),
    ]
}

fn halved(exercise: &Exercise) -> Exercise {
    Exercise {
        reps: exercise.reps.map(|r| r / 2),
        distance_meters: exercise.distance_meters.map(|d| d / 2),
        ..exercise.clone()
    }
}

fn round(name: String, exercises: Vec<Exercise>) -> WorkoutRound {
    WorkoutRound {
        name,
        repeat: 1,
        rest_seconds: None,
        exercises,
    }
}

fn hyrox_simulation() -> WorkoutBreakdown {
    let rounds = hyrox_stations()
        .into_iter()
        .enumerate()
        .map(|(i, station)| {
            round(
                format!("Station {}: {}", i + 1, station.name),
                vec![Exercise::distance("Run", 1000), station],
            )
        })
        .collect();

    WorkoutBreakdown {
        format: Some("For Time".to_string()),
        time_cap_minutes: Some(120),
        rounds,
    }
}

fn hyrox_half() -> WorkoutBreakdown {
    // SkiErg, Sled Push, Row, Wall Balls
    let rounds = hyrox_stations()
        .iter()
        .enumerate()
        .filter(|(i, _)| matches!(i, 0 | 1 | 4 | 7))
        .enumerate()
        .map(|(n, (_, station))| {
            round(
                format!("Block {}: {}", n + 1, station.name),
                vec![Exercise::distance("Run", 500), halved(station)],
            )
        })
        .collect();

    WorkoutBreakdown {
        format: Some("For Time".to_string()),
        time_cap_minutes: Some(45),
        rounds,
    }
}

fn hyrox_stations_emom() -> WorkoutBreakdown {
    let stations = vec![
        Exercise::distance("SkiErg", 250),
        Exercise::distance("Sled Push", 25).with_weight("102kg"),
        Exercise::distance("Sled Pull", 25).with_weight("78kg"),
        Exercise::reps("Burpee Broad Jumps", 8),
        Exercise::distance("Row", 250),
        Exercise::distance("Farmers Carry", 50).with_weight("2x24kg"),
        Exercise::distance("Sandbag Lunges", 20).with_weight("20kg"),
        Exercise::reps("Wall Balls", 20).with_weight("6kg"),
    ];

    WorkoutBreakdown {
        format: Some("EMOM".to_string()),
        time_cap_minutes: Some(32),
        rounds: vec![WorkoutRound {
            name: "Every minute, one station".to_string(),
            repeat: 4,
            rest_seconds: Some(60),
            exercises: stations,
        }],
    }
}

fn engine_builder() -> WorkoutBreakdown {
    WorkoutBreakdown {
        format: Some("AMRAP".to_string()),
        time_cap_minutes: Some(20),
        rounds: vec![
            WorkoutRound {
                name: "Warm-up".to_string(),
                repeat: 2,
                rest_seconds: None,
                exercises: vec![
                    Exercise::distance("Row", 250),
                    Exercise::reps("Air Squats", 10),
                    Exercise::timed("Plank", 30),
                ],
            },
            round(
                "Engine".to_string(),
                vec![
                    Exercise::distance("Run", 400),
                    Exercise::reps("Wall Balls", 15).with_weight("9kg"),
                    Exercise::reps("Burpees", 10),
                    Exercise::distance("Row", 300),
                ],
            ),
        ],
    }
}

/// Catalog of built-in workout templates
pub struct WorkoutTemplateService;

impl WorkoutTemplateService {
    pub fn all() -> Vec<WorkoutTemplate> {
        vec![
            WorkoutTemplate {
                key: "hyrox-simulation",
                name: "HYROX Simulation",
                description: "Full race simulation: 8 x 1km run, each followed by a station",
                workout: hyrox_simulation(),
            },
            WorkoutTemplate {
                key: "hyrox-half",
                name: "HYROX Half",
                description: "4 x 500m run, each followed by a half-volume station",
                workout: hyrox_half(),
            },
            WorkoutTemplate {
                key: "hyrox-stations-emom",
                name: "HYROX Stations EMOM",
                description: "Station work only, one station every minute",
                workout: hyrox_stations_emom(),
            },
            WorkoutTemplate {
                key: "engine-builder",
                name: "Engine Builder",
                description: "AMRAP conditioning for aerobic capacity",
                workout: engine_builder(),
            },
        ]
    }

    pub fn find(key: &str) -> Option<WorkoutTemplate> {
        let key = key.trim();
        Self::all().into_iter().find(|t| t.key.eq_ignore_ascii_case(key))
    }

    pub fn workout_for(key: &str) -> Option<WorkoutBreakdown> {
        Self::find(key).map(|t| t.workout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyrox_simulation_shape() {
        let workout = WorkoutTemplateService::workout_for("hyrox-simulation").unwrap();
        assert_eq!(workout.rounds.len(), 8);
        assert!(workout
            .rounds
            .iter()
            .all(|r| r.exercises[0].name == "Run" && r.exercises[0].distance_meters == Some(1000)));

        let stats = workout.stats();
        assert_eq!(stats.total_exercises, 16);
        assert_eq!(stats.total_reps, 100);
        // 8km running plus SkiErg, sleds, BBJ, row, carry and lunges
        assert_eq!(stats.total_distance_meters, 8000 + 1000 + 50 + 50 + 80 + 1000 + 200 + 100);
    }

    #[test]
    fn test_hyrox_half_halves_volume() {
        let workout = WorkoutTemplateService::workout_for("hyrox-half").unwrap();
        assert_eq!(workout.rounds.len(), 4);
        let preview = workout.render_preview();
        assert!(preview.contains("500m SkiErg"));
        assert!(preview.contains("25m Sled Push"));
        assert!(preview.contains("50 Wall Balls"));
    }

    #[test]
    fn test_all_templates_are_valid() {
        let templates = WorkoutTemplateService::all();
        assert_eq!(templates.len(), 4);
        for template in templates {
            assert!(template.workout.validate().is_ok(), "{} is invalid", template.key);
            assert!(!template.workout.render_preview().is_empty());
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(WorkoutTemplateService::find("murph").is_none());
        assert!(WorkoutTemplateService::find(" ENGINE-BUILDER ").is_some());
    }
}
