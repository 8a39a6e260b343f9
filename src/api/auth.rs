use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;

use crate::auth::{
    AdminSession, AuthError, AuthResponse, CreateUserRequest, LoginRequest, SessionInfo,
    UserInfo, UserSession,
};
use crate::error::{AppError, AppResult};
use crate::services::EntityKind;
use crate::state::AppState;

/// Authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/users", post(create_user))
}

/// Login a back-office user
#[tracing::instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

/// Current session
async fn me(session: UserSession) -> Json<SessionInfo> {
    Json(SessionInfo::from(&session))
}

/// Create a staff or admin account
#[tracing::instrument(skip_all)]
async fn create_user(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let user = state.auth.create_user(request).await?;
    tracing::info!(
        user_id = %user.id,
        role = user.role.as_str(),
        created_by = %admin.email,
        "back-office user created"
    );
    state.changes.created(EntityKind::User, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}
