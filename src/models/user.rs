use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "Nama harus 2 sampai 100 karakter"))]
    pub nama: String,
    #[validate(email(message = "Format email tidak valid"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password minimal 6 karakter"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Format email tidak valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password wajib diisi"))]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct UserProfile {
    pub id_user: i32,
    pub nama: String,
    pub email: String,
}

/// Row used to check a login attempt. Never serialized.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserCredentials {
    pub id_user: i32,
    pub nama: String,
    pub email: String,
    pub password: String,
}

impl From<UserCredentials> for UserProfile {
    fn from(row: UserCredentials) -> Self {
        Self {
            id_user: row.id_user,
            nama: row.nama,
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Email addresses are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
