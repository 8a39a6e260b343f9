use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::{AuthService, JwtService};
use crate::services::{
    ChangeBus, ClassService, CoachService, EventService, ProgramService, SettingsService,
    SponsorService, SponsorshipService,
};

/// Shared state handed to every router
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthService,
    pub changes: ChangeBus,
    pub classes: ClassService,
    pub coaches: CoachService,
    pub programs: ProgramService,
    pub events: EventService,
    pub sponsors: SponsorService,
    pub sponsorship: SponsorshipService,
    pub settings: SettingsService,
}

impl AppState {
    pub fn new(db: PgPool, jwt_secret: &str) -> Self {
        let changes = ChangeBus::default();

        Self {
            auth: AuthService::new(db.clone(), jwt_secret),
            classes: ClassService::new(db.clone(), changes.clone()),
            coaches: CoachService::new(db.clone(), changes.clone()),
            programs: ProgramService::new(db.clone(), changes.clone()),
            events: EventService::new(db.clone(), changes.clone()),
            sponsors: SponsorService::new(db.clone(), changes.clone()),
            sponsorship: SponsorshipService::new(db.clone(), changes.clone()),
            settings: SettingsService::new(db.clone(), changes.clone()),
            changes,
            db,
        }
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.jwt().clone()
    }
}
