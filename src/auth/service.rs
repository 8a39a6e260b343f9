use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, PasswordPolicy,
};
use crate::auth::{
    AuthError, AuthResponse, CreateUserRequest, JwtService, LoginRequest, UserInfo, UserRole,
};
use crate::models::validation::validate_email;

/// Back-office account as stored in `admin_users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AdminUser {
    fn role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or(UserRole::Staff)
    }

    fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            email: self.email.clone(),
            role: self.role(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret),
            db,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Login a back-office user
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&request.password, &password_hash))
            .await
            .context("password verification task failed")??;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let access_token = self
            .jwt_service
            .create_access_token(user.id, &user.email, user.role())?;

        tracing::info!(user_id = %user.id, "back-office login");

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            user: user.info(),
        })
    }

    /// Create a back-office user
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserInfo, AuthError> {
        let email = request.email.trim().to_lowercase();
        validate_email(&email).map_err(|e| AuthError::EmailValidation(e.to_string()))?;

        validate_password_strength(&request.password, &PasswordPolicy::default())?;

        if self.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .context("password hashing task failed")??;
        let role = request.role.unwrap_or(UserRole::Staff);

        let user = sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (email, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, role, is_active, created_at, updated_at",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            // a concurrent create can slip past the lookup above
            if is_unique_violation(&err) {
                AuthError::EmailAlreadyExists
            } else {
                AuthError::Database(err)
            }
        })?;

        Ok(user.info())
    }

    /// Create the bootstrap admin when it does not exist yet
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        if self.get_user_by_email(&email.trim().to_lowercase()).await?.is_some() {
            return Ok(false);
        }

        self.create_user(CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: Some(UserRole::Admin),
        })
        .await?;

        Ok(true)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AdminUser>, AuthError> {
        let user = sqlx::query_as::<_, AdminUser>(
            "SELECT id, email, password_hash, role, is_active, created_at, updated_at
             FROM admin_users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
