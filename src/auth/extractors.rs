use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};

use crate::auth::{AuthError, JwtService, UserRole, UserSession};

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => AuthError::MissingAuthHeader,
                    _ => AuthError::InvalidToken,
                })?;

        JwtService::from_ref(state).extract_user_session(bearer.token())
    }
}

/// Session of a staff member or admin; guards schedule and content changes.
#[derive(Debug, Clone)]
pub struct StaffSession(pub UserSession);

#[async_trait]
impl<S> FromRequestParts<S> for StaffSession
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = UserSession::from_request_parts(parts, state).await?;
        if !session.role.can_access(UserRole::Staff) {
            return Err(AuthError::InsufficientPermissions);
        }
        Ok(Self(session))
    }
}

/// Admin-only session; guards sponsorships, settings and accounts.
#[derive(Debug, Clone)]
pub struct AdminSession(pub UserSession);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    JwtService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = UserSession::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }
        Ok(Self(session))
    }
}

/// True when an optional session belongs to staff or an admin.
pub fn is_staff(session: &Option<UserSession>) -> bool {
    session.as_ref().is_some_and(UserSession::is_staff)
}

/// True when an optional session belongs to an admin.
pub fn is_admin(session: &Option<UserSession>) -> bool {
    session.as_ref().is_some_and(UserSession::is_admin)
}
