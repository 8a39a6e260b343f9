use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::auth::{is_admin, AdminSession, UserSession};
use crate::error::{AppError, AppResult};
use crate::models::{CreateSponsorRequest, Sponsor, SponsorQuery, UpdateSponsorRequest};
use crate::state::AppState;

pub fn sponsor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sponsors).post(create_sponsor))
        .route(
            "/:sponsor_id",
            get(get_sponsor)
                .patch(update_sponsor)
                .put(update_sponsor)
                .delete(delete_sponsor),
        )
        .route("/:sponsor_id/toggle-active", post(toggle_sponsor))
}

async fn list_sponsors(
    State(state): State<AppState>,
    session: Option<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<SponsorQuery>, AppError>,
) -> AppResult<Json<Vec<Sponsor>>> {
    let include_inactive = query.include_inactive && is_admin(&session);
    let sponsors = state.sponsors.list_sponsors(include_inactive).await?;
    Ok(Json(sponsors))
}

async fn get_sponsor(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(sponsor_id): Path<Uuid>,
) -> AppResult<Json<Sponsor>> {
    let sponsor = state
        .sponsors
        .get_sponsor(sponsor_id)
        .await?
        .filter(|sponsor| sponsor.is_active || is_admin(&session))
        .ok_or(AppError::NotFound("Sponsor"))?;

    Ok(Json(sponsor))
}

async fn create_sponsor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateSponsorRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Sponsor>)> {
    request.validate().map_err(AppError::invalid)?;
    let sponsor = state.sponsors.create_sponsor(request).await?;
    Ok((StatusCode::CREATED, Json(sponsor)))
}

async fn update_sponsor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(sponsor_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateSponsorRequest>, AppError>,
) -> AppResult<Json<Sponsor>> {
    request.validate().map_err(AppError::invalid)?;

    let sponsor = state
        .sponsors
        .update_sponsor(sponsor_id, request)
        .await?
        .ok_or(AppError::NotFound("Sponsor"))?;

    Ok(Json(sponsor))
}

async fn toggle_sponsor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(sponsor_id): Path<Uuid>,
) -> AppResult<Json<Sponsor>> {
    let sponsor = state
        .sponsors
        .toggle_active(sponsor_id)
        .await?
        .ok_or(AppError::NotFound("Sponsor"))?;

    Ok(Json(sponsor))
}

async fn delete_sponsor(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(sponsor_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sponsors.delete_sponsor(sponsor_id).await? {
        return Err(AppError::NotFound("Sponsor"));
    }
    Ok(StatusCode::NO_CONTENT)
}
