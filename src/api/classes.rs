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
    ClassCounters, ClassDetail, ClassQuery, ClassStatus, CreateClassRequest, GymClass,
    UpdateClassRequest, WorkoutBreakdown,
};
use crate::services::{ClassFilter, WorkoutTemplateService};
use crate::state::AppState;

pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/counters", get(class_counters))
        .route(
            "/:class_id",
            get(get_class)
                .patch(update_class)
                .put(update_class)
                .delete(delete_class),
        )
        .route("/:class_id/approve", post(approve_class))
        .route("/:class_id/cancel", post(cancel_class))
}

/// Class schedule. Anonymous visitors only see approved classes.
async fn list_classes(
    State(state): State<AppState>,
    session: Option<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<ClassQuery>, AppError>,
) -> AppResult<Json<Vec<GymClass>>> {
    let status = if is_staff(&session) {
        query.status
    } else {
        Some(ClassStatus::Approved)
    };

    let classes = state
        .classes
        .list_classes(ClassFilter {
            status,
            from: query.from,
            to: query.to,
        })
        .await?;

    Ok(Json(classes))
}

async fn get_class(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(class_id): Path<Uuid>,
) -> AppResult<Json<ClassDetail>> {
    let class = state
        .classes
        .get_class(class_id)
        .await?
        .filter(|class| class.status == ClassStatus::Approved || is_staff(&session))
        .ok_or(AppError::NotFound("Class"))?;

    Ok(Json(ClassDetail::from(class)))
}

/// Explicit workout wins; otherwise the named template; otherwise empty
fn resolve_workout(request: &CreateClassRequest) -> AppResult<WorkoutBreakdown> {
    match (&request.workout, request.template.as_deref()) {
        (Some(workout), _) => Ok(workout.clone()),
        (None, Some(key)) if !key.trim().is_empty() => WorkoutTemplateService::workout_for(key)
            .ok_or_else(|| AppError::validation(format!("Unknown workout template '{}'", key.trim()))),
        _ => Ok(WorkoutBreakdown::default()),
    }
}

#[tracing::instrument(skip_all)]
async fn create_class(
    State(state): State<AppState>,
    StaffSession(session): StaffSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateClassRequest>, AppError>,
) -> AppResult<(StatusCode, Json<ClassDetail>)> {
    request.validate().map_err(AppError::invalid)?;
    let workout = resolve_workout(&request)?;

    let class = state.classes.create_class(request, workout).await?;
    tracing::info!(class_id = %class.id, by = %session.email, "class created");

    Ok((StatusCode::CREATED, Json(ClassDetail::from(class))))
}

async fn update_class(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(class_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateClassRequest>, AppError>,
) -> AppResult<Json<ClassDetail>> {
    request.validate().map_err(AppError::invalid)?;

    let class = state
        .classes
        .update_class(class_id, request)
        .await?
        .ok_or(AppError::NotFound("Class"))?;

    Ok(Json(ClassDetail::from(class)))
}

async fn delete_class(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(class_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.classes.delete_class(class_id).await? {
        return Err(AppError::NotFound("Class"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn approve_class(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(class_id): Path<Uuid>,
) -> AppResult<Json<ClassDetail>> {
    set_status(&state, class_id, ClassStatus::Approved).await
}

async fn cancel_class(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(class_id): Path<Uuid>,
) -> AppResult<Json<ClassDetail>> {
    set_status(&state, class_id, ClassStatus::Cancelled).await
}

async fn set_status(
    state: &AppState,
    class_id: Uuid,
    status: ClassStatus,
) -> AppResult<Json<ClassDetail>> {
    let class = state
        .classes
        .set_status(class_id, status)
        .await?
        .ok_or(AppError::NotFound("Class"))?;

    Ok(Json(ClassDetail::from(class)))
}

/// Dashboard counters
async fn class_counters(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
) -> AppResult<Json<ClassCounters>> {
    let counters = state.classes.counters(today()).await?;
    Ok(Json(counters))
}
