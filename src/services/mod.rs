// Data access and business logic, one service per entity

pub mod change_feed;
pub mod class_service;
pub mod coach_service;
pub mod event_service;
pub mod program_service;
pub mod settings_service;
pub mod sponsor_service;
pub mod sponsorship_service;
pub mod workout_template_service;

pub use change_feed::{ChangeAction, ChangeBus, ChangeEvent, EntityKind};
pub use class_service::{ClassFilter, ClassService};
pub use coach_service::CoachService;
pub use event_service::{EventFilter, EventService, RegistrationOutcome};
pub use program_service::ProgramService;
pub use settings_service::SettingsService;
pub use sponsor_service::SponsorService;
pub use sponsorship_service::SponsorshipService;
pub use workout_template_service::{WorkoutTemplate, WorkoutTemplateService};
