use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::today;
use crate::auth::{is_staff, StaffSession, UserSession};
use crate::error::{AppError, AppResult};
use crate::models::{
    CompletePastResponse, CreateEventRequest, EventQuery, EventStatus, EventView,
    RegistrationRefusal, UpdateEventRequest,
};
use crate::services::{EventFilter, RegistrationOutcome};
use crate::state::AppState;

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/complete-past", post(complete_past_events))
        .route(
            "/:event_id",
            get(get_event)
                .patch(update_event)
                .put(update_event)
                .delete(delete_event),
        )
        .route("/:event_id/register", post(register_for_event))
}

/// Events with status recomputed against today. Drafts and cancellations are staff-only.
async fn list_events(
    State(state): State<AppState>,
    session: Option<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<EventQuery>, AppError>,
) -> AppResult<Json<Vec<EventView>>> {
    let today = today();
    let public_only = !is_staff(&session);
    let filter = EventFilter {
        status: query.status,
        category: query.category,
        public_only,
    };

    let events = state
        .events
        .list_events(filter, today)
        .await?
        .into_iter()
        .map(|event| EventView::new(event, today))
        .collect();

    Ok(Json(events))
}

async fn get_event(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventView>> {
    let event = state
        .events
        .get_event(event_id)
        .await?
        .filter(|event| {
            matches!(event.status, EventStatus::Published | EventStatus::Completed)
                || is_staff(&session)
        })
        .ok_or(AppError::NotFound("Event"))?;

    Ok(Json(EventView::new(event, today())))
}

async fn ensure_sponsor_exists(state: &AppState, sponsor_id: Option<Uuid>) -> AppResult<()> {
    if let Some(sponsor_id) = sponsor_id {
        if !state.sponsors.sponsor_exists(sponsor_id).await? {
            return Err(AppError::validation(format!("Sponsor {} does not exist", sponsor_id)));
        }
    }
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn create_event(
    State(state): State<AppState>,
    StaffSession(session): StaffSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateEventRequest>, AppError>,
) -> AppResult<(StatusCode, Json<EventView>)> {
    request.validate().map_err(AppError::invalid)?;
    ensure_sponsor_exists(&state, request.sponsor_id).await?;

    let event = state.events.create_event(request).await?;
    tracing::info!(event_id = %event.id, by = %session.email, "event created");

    Ok((StatusCode::CREATED, Json(EventView::new(event, today()))))
}

async fn update_event(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(event_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateEventRequest>, AppError>,
) -> AppResult<Json<EventView>> {
    let existing = state
        .events
        .get_event(event_id)
        .await?
        .ok_or(AppError::NotFound("Event"))?;

    request.validate_against(&existing).map_err(AppError::invalid)?;
    ensure_sponsor_exists(&state, request.sponsor_id).await?;

    let event = state
        .events
        .update_event(event_id, request)
        .await?
        .ok_or(AppError::NotFound("Event"))?;

    Ok(Json(EventView::new(event, today())))
}

async fn delete_event(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.events.delete_event(event_id).await? {
        return Err(AppError::NotFound("Event"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Take one spot on a published event
async fn register_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventView>> {
    let today = today();
    match state.events.register(event_id, today).await? {
        RegistrationOutcome::Registered(event) => Ok(Json(EventView::new(event, today))),
        RegistrationOutcome::NotFound
        | RegistrationOutcome::Refused(RegistrationRefusal::NotPublished) => {
            Err(AppError::NotFound("Event"))
        }
        RegistrationOutcome::Refused(RegistrationRefusal::Closed) => Err(AppError::validation(
            "Registration is closed for this event",
        )),
        RegistrationOutcome::Refused(RegistrationRefusal::Full) => {
            Err(AppError::Conflict("Event is full".to_string()))
        }
    }
}

/// Persist `completed` for published events whose date has passed
async fn complete_past_events(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
) -> AppResult<Json<CompletePastResponse>> {
    let completed = state.events.complete_past_events(today()).await?;
    Ok(Json(CompletePastResponse { completed }))
}
