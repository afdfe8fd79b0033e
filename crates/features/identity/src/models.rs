use crate::repository::UserRecord;
use crate::token::TokenPair;
use chrono::{DateTime, Utc};
use lvai_kernel::prelude::*;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=100;
const FULL_NAME_MAX: usize = 100;
const AVATAR_URL_MAX: usize = 500;

#[api_model]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !is_email(&self.email) {
            return Err(ApiError::validation("email is not a valid address"));
        }
        if !USERNAME_LEN.contains(&self.username.chars().count()) {
            return Err(ApiError::validation("username must be 3 to 50 characters"));
        }
        if !PASSWORD_LEN.contains(&self.password.chars().count()) {
            return Err(ApiError::validation("password must be 8 to 100 characters"));
        }
        if self.full_name.as_ref().is_some_and(|n| n.chars().count() > FULL_NAME_MAX) {
            return Err(ApiError::validation("full_name must be at most 100 characters"));
        }
        Ok(())
    }
}

#[api_model]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[api_model]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[api_model]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.full_name.as_ref().is_some_and(|n| n.chars().count() > FULL_NAME_MAX) {
            return Err(ApiError::validation("full_name must be at most 100 characters"));
        }
        if self.avatar_url.as_ref().is_some_and(|u| u.len() > AVATAR_URL_MAX) {
            return Err(ApiError::validation("avatar_url must be at most 500 characters"));
        }
        Ok(())
    }
}

#[api_model]
/// Public view of an account
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.uid.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            is_superuser: user.is_superuser,
            credits: user.credits,
            created_at: from_millis(user.created_at),
            last_login_at: user.last_login_at.map(from_millis),
        }
    }
}

#[api_model]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_owned(),
            expires_in: pair.expires_in,
        }
    }
}

#[api_model]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
    pub token: TokenResponse,
}

#[api_model]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Accepts `local@domain.tld` with no whitespace and a single `@`.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
