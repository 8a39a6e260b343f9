use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::models::{WorkoutPreview, WorkoutPreviewRequest};
use crate::services::{WorkoutTemplate, WorkoutTemplateService};
use crate::state::AppState;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workout-templates", get(list_templates))
        .route("/workout-preview", post(preview_workout))
}

/// Built-in templates a class can be created from
async fn list_templates() -> Json<Vec<WorkoutTemplate>> {
    Json(WorkoutTemplateService::all())
}

/// Render the text preview and totals for an unsaved workout
async fn preview_workout(
    WithRejection(Json(request), _): WithRejection<Json<WorkoutPreviewRequest>, AppError>,
) -> AppResult<Json<WorkoutPreview>> {
    request.workout.validate().map_err(AppError::invalid)?;
    Ok(Json(WorkoutPreview::from(&request.workout)))
}
