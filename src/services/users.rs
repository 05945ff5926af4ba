use sea_orm::{DatabaseConnection, DbErr, FromQueryResult, SqlErr};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, AuthError, AuthService, AuthUser},
    db::statement,
    errors::{ResultExt, ServiceError},
    models::user::{
        normalize_email, LoginRequest, LoginResponse, RegisterRequest, UserCredentials,
        UserProfile,
    },
};

pub const FIND_CREDENTIALS_SQL: &str =
    "SELECT id_user, nama, email, password FROM sigab_app.user_app WHERE LOWER(email) = $1";

pub const INSERT_USER_SQL: &str = "INSERT INTO sigab_app.user_app \
     (nama, email, password, created_at, updated_at) \
     VALUES ($1, $2, $3, NOW(), NOW()) \
     RETURNING id_user, nama, email";

pub const FIND_PROFILE_SQL: &str =
    "SELECT id_user, nama, email FROM sigab_app.user_app WHERE id_user = $1";

pub const EMAIL_TAKEN_MESSAGE: &str = "Email sudah terdaftar";

/// Account registration, login and profile lookup.
#[derive(Debug, Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        if self.find_credentials(&email).await?.is_some() {
            return Err(ServiceError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .or_internal("Gagal memproses password")??;

        let created = UserProfile::find_by_statement(statement(
            INSERT_USER_SQL,
            [
                request.nama.trim().into(),
                email.clone().into(),
                password_hash.into(),
            ],
        ))
        .one(&*self.db)
        .await;

        match created {
            Ok(Some(profile)) => {
                info!(id_user = profile.id_user, "User registered");
                Ok(profile)
            }
            Ok(None) => Err(DbErr::RecordNotInserted).or_internal("Gagal mendaftarkan pengguna"),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(ServiceError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()))
            }
            Err(err) => Err(err).or_internal("Gagal mendaftarkan pengguna"),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);

        let Some(credentials) = self.find_credentials(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let password = request.password;
        let stored_hash = credentials.password.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .or_internal("Gagal memproses password")?;
        if !verified {
            warn!(id_user = credentials.id_user, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self.auth.generate_token(
            credentials.id_user,
            &credentials.nama,
            &credentials.email,
        )?;

        info!(id_user = credentials.id_user, "User logged in");
        Ok(LoginResponse {
            token: issued.token,
            token_type: issued.token_type,
            expires_in: issued.expires_in,
            user: credentials.into(),
        })
    }

    /// Invalidates the token the user authenticated with.
    pub async fn logout(&self, user: &AuthUser) {
        self.auth.revoke(user).await;
        info!(id_user = user.user_id, "User logged out");
    }

    pub async fn profile(&self, id_user: i32) -> Result<UserProfile, ServiceError> {
        UserProfile::find_by_statement(statement(FIND_PROFILE_SQL, [id_user.into()]))
            .one(&*self.db)
            .await
            .or_internal("Terjadi kesalahan saat mengambil profil pengguna")?
            .ok_or_else(|| ServiceError::NotFound("User tidak ditemukan".to_string()))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, ServiceError> {
        UserCredentials::find_by_statement(statement(FIND_CREDENTIALS_SQL, [email.into()]))
            .one(&*self.db)
            .await
            .or_internal("Terjadi kesalahan saat mencari pengguna")
    }
}
