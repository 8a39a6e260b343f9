use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::auth::{is_staff, StaffSession, UserSession};
use crate::error::{AppError, AppResult};
use crate::models::{Coach, CoachQuery, CreateCoachRequest, UpdateCoachRequest};
use crate::state::AppState;

pub fn coach_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coaches).post(create_coach))
        .route(
            "/:coach_id",
            get(get_coach)
                .patch(update_coach)
                .put(update_coach)
                .delete(delete_coach),
        )
        .route("/:coach_id/toggle-active", post(toggle_coach))
}

/// Coaches in display order; inactive ones only for staff who ask
async fn list_coaches(
    State(state): State<AppState>,
    session: Option<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<CoachQuery>, AppError>,
) -> AppResult<Json<Vec<Coach>>> {
    let include_inactive = query.include_inactive && is_staff(&session);
    let coaches = state.coaches.list_coaches(include_inactive).await?;
    Ok(Json(coaches))
}

async fn get_coach(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(coach_id): Path<Uuid>,
) -> AppResult<Json<Coach>> {
    let coach = state
        .coaches
        .get_coach(coach_id)
        .await?
        .filter(|coach| coach.is_active || is_staff(&session))
        .ok_or(AppError::NotFound("Coach"))?;

    Ok(Json(coach))
}

async fn create_coach(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateCoachRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Coach>)> {
    request.validate().map_err(AppError::invalid)?;
    let coach = state.coaches.create_coach(request).await?;
    Ok((StatusCode::CREATED, Json(coach)))
}

async fn update_coach(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(coach_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateCoachRequest>, AppError>,
) -> AppResult<Json<Coach>> {
    request.validate().map_err(AppError::invalid)?;

    let coach = state
        .coaches
        .update_coach(coach_id, request)
        .await?
        .ok_or(AppError::NotFound("Coach"))?;

    Ok(Json(coach))
}

async fn toggle_coach(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(coach_id): Path<Uuid>,
) -> AppResult<Json<Coach>> {
    let coach = state
        .coaches
        .toggle_active(coach_id)
        .await?
        .ok_or(AppError::NotFound("Coach"))?;

    Ok(Json(coach))
}

async fn delete_coach(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(coach_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.coaches.delete_coach(coach_id).await? {
        return Err(AppError::NotFound("Coach"));
    }
    Ok(StatusCode::NO_CONTENT)
}
