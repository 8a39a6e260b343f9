use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::auth::{is_admin, AdminSession, UserSession};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateInquiryRequest, CreatePackageRequest, InquiryCounts, InquiryQuery, PackageQuery,
    SponsorshipInquiry, SponsorshipPackage, UpdateInquiryRequest, UpdatePackageRequest,
};
use crate::state::AppState;

/// Routes under `/api/sponsorship-packages`
pub fn package_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route(
            "/:package_id",
            get(get_package)
                .patch(update_package)
                .put(update_package)
                .delete(delete_package),
        )
}

/// Routes under `/api/sponsorship-inquiries`
pub fn inquiry_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inquiries).post(create_inquiry))
        .route("/counts", get(inquiry_counts))
        .route(
            "/:inquiry_id",
            get(get_inquiry).patch(update_inquiry).delete(delete_inquiry),
        )
}

async fn list_packages(
    State(state): State<AppState>,
    session: Option<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<PackageQuery>, AppError>,
) -> AppResult<Json<Vec<SponsorshipPackage>>> {
    let include_inactive = query.include_inactive && is_admin(&session);
    let packages = state.sponsorship.list_packages(include_inactive).await?;
    Ok(Json(packages))
}

async fn get_package(
    State(state): State<AppState>,
    session: Option<UserSession>,
    Path(package_id): Path<Uuid>,
) -> AppResult<Json<SponsorshipPackage>> {
    let package = state
        .sponsorship
        .get_package(package_id)
        .await?
        .filter(|package| package.is_active || is_admin(&session))
        .ok_or(AppError::NotFound("Sponsorship package"))?;

    Ok(Json(package))
}

async fn create_package(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<CreatePackageRequest>, AppError>,
) -> AppResult<(StatusCode, Json<SponsorshipPackage>)> {
    request.validate().map_err(AppError::invalid)?;
    let package = state.sponsorship.create_package(request).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

async fn update_package(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(package_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdatePackageRequest>, AppError>,
) -> AppResult<Json<SponsorshipPackage>> {
    request.validate().map_err(AppError::invalid)?;

    let package = state
        .sponsorship
        .update_package(package_id, request)
        .await?
        .ok_or(AppError::NotFound("Sponsorship package"))?;

    Ok(Json(package))
}

async fn delete_package(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(package_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sponsorship.delete_package(package_id).await? {
        return Err(AppError::NotFound("Sponsorship package"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Public contact form. The package, when given, must exist and be on offer.
#[tracing::instrument(skip_all)]
async fn create_inquiry(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateInquiryRequest>, AppError>,
) -> AppResult<(StatusCode, Json<SponsorshipInquiry>)> {
    request.validate().map_err(AppError::invalid)?;

    if let Some(package_id) = request.package_id {
        let on_offer = state
            .sponsorship
            .get_package(package_id)
            .await?
            .is_some_and(|package| package.is_active);
        if !on_offer {
            return Err(AppError::validation("Selected sponsorship package is not available"));
        }
    }

    let inquiry = state.sponsorship.create_inquiry(request).await?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// Newest first
async fn list_inquiries(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    WithRejection(Query(query), _): WithRejection<Query<InquiryQuery>, AppError>,
) -> AppResult<Json<Vec<SponsorshipInquiry>>> {
    let inquiries = state.sponsorship.list_inquiries(query.status).await?;
    Ok(Json(inquiries))
}

async fn get_inquiry(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(inquiry_id): Path<Uuid>,
) -> AppResult<Json<SponsorshipInquiry>> {
    let inquiry = state
        .sponsorship
        .get_inquiry(inquiry_id)
        .await?
        .ok_or(AppError::NotFound("Sponsorship inquiry"))?;

    Ok(Json(inquiry))
}

async fn update_inquiry(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(inquiry_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateInquiryRequest>, AppError>,
) -> AppResult<Json<SponsorshipInquiry>> {
    let inquiry = state
        .sponsorship
        .update_inquiry(inquiry_id, request)
        .await?
        .ok_or(AppError::NotFound("Sponsorship inquiry"))?;

    Ok(Json(inquiry))
}

async fn delete_inquiry(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(inquiry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sponsorship.delete_inquiry(inquiry_id).await? {
        return Err(AppError::NotFound("Sponsorship inquiry"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn inquiry_counts(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> AppResult<Json<InquiryCounts>> {
    let counts = state.sponsorship.inquiry_counts().await?;
    Ok(Json(counts))
}
