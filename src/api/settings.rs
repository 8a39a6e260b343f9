use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::error::{AppError, AppResult};
use crate::models::{AppSettings, PlaylistInput, UpdateSettingsRequest};
use crate::state::AppState;

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/playlists", post(add_playlist))
        .route("/playlists/:playlist_id", delete(remove_playlist))
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<AppSettings>> {
    let settings = state.settings.get_settings().await?;
    Ok(Json(settings))
}

/// Replace the playlist list
async fn update_settings(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<UpdateSettingsRequest>, AppError>,
) -> AppResult<Json<AppSettings>> {
    request.validate().map_err(AppError::invalid)?;

    let playlists = request
        .playlists
        .into_iter()
        .map(PlaylistInput::into_playlist)
        .collect();
    let settings = state.settings.replace_playlists(playlists).await?;

    Ok(Json(settings))
}

async fn add_playlist(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    WithRejection(Json(input), _): WithRejection<Json<PlaylistInput>, AppError>,
) -> AppResult<(StatusCode, Json<AppSettings>)> {
    input.validate().map_err(AppError::invalid)?;

    // appended playlists always get a fresh id
    let playlist = PlaylistInput { id: None, ..input }.into_playlist();
    let settings = state.settings.add_playlist(playlist).await?;

    Ok((StatusCode::CREATED, Json(settings)))
}

async fn remove_playlist(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(playlist_id): Path<Uuid>,
) -> AppResult<Json<AppSettings>> {
    let settings = state
        .settings
        .remove_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound("Playlist"))?;

    Ok(Json(settings))
}
