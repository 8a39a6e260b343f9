use axum::{
    extract::{Path, State},
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
use crate::models::{CreateProgramRequest, ProgramResponse, UpdateProgramRequest};
use crate::state::AppState;

pub fn program_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route(
            "/:program_id",
            get(get_program)
                .patch(update_program)
                .put(update_program)
                .delete(delete_program),
        )
        .route("/:program_id/recalculate", post(recalculate_program))
}

/// Programs with week and phase status computed against today
async fn list_programs(
    State(state): State<AppState>,
    session: Option<UserSession>,
) -> AppResult<Json<Vec<ProgramResponse>>> {
    let today = today();
    let programs = state
        .programs
        .list_programs(is_staff(&session))
        .await?
        .into_iter()
        .map(|program| ProgramResponse::from(program.refreshed(today)))
        .collect();

    Ok(Json(programs))
}

async fn get_program(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<ProgramResponse>> {
    let program = state
        .programs
        .get_program(program_id)
        .await?
        .filter(|program| program.is_active || is_staff(&session))
        .ok_or(AppError::NotFound("Program"))?;

    Ok(Json(ProgramResponse::from(program.refreshed(today()))))
}

async fn create_program(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateProgramRequest>, AppError>,
) -> AppResult<(StatusCode, Json<ProgramResponse>)> {
    request.validate().map_err(AppError::invalid)?;
    let program = state.programs.create_program(request, today()).await?;
    Ok((StatusCode::CREATED, Json(ProgramResponse::from(program))))
}

async fn update_program(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(program_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProgramRequest>, AppError>,
) -> AppResult<Json<ProgramResponse>> {
    request.validate().map_err(AppError::invalid)?;

    let program = state
        .programs
        .update_program(program_id, request, today())
        .await?
        .ok_or(AppError::NotFound("Program"))?;

    Ok(Json(ProgramResponse::from(program)))
}

/// Persist current week and phase statuses
async fn recalculate_program(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<ProgramResponse>> {
    let program = state
        .programs
        .recalculate(program_id, today())
        .await?
        .ok_or(AppError::NotFound("Program"))?;

    Ok(Json(ProgramResponse::from(program)))
}

async fn delete_program(
    State(state): State<AppState>,
    StaffSession(_): StaffSession,
    Path(program_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.programs.delete_program(program_id).await? {
        return Err(AppError::NotFound("Program"));
    }
    Ok(StatusCode::NO_CONTENT)
}
