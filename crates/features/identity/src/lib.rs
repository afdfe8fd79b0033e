//! Identity feature slice: registration, login, JWT sessions and the `CurrentUser` extractor.
//!
//! Passwords are Argon2id hashes. Access and refresh tokens are HS256 JWTs whose `jti`
//! can be revoked on logout; revocations live in memory until the token expires.

mod error;
mod extract;
mod handlers;
mod models;
mod password;
mod repository;
mod token;

pub use error::{IdentityError, IdentityErrorExt};
pub use extract::{AdminUser, CurrentUser};
pub use models::{AuthResponse, MessageResponse, TokenResponse, UserResponse};
pub use password::{hash_password, verify_password};
pub use repository::{AccountConflict, UserRecord, UserRepository};
pub use token::{Claims, TokenKind, TokenPair, TokenRejection, TokenService};

use lvai_database::Database;
use lvai_domain::config::ApiConfig;
use lvai_kernel::domain::registry::InitializedSlice;
use lvai_kernel::prelude::{ApiError, ApiState};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Identity feature state
#[lvai_derive::lvai_slice]
pub struct Identity {
    pub tokens: TokenService,
    pub users: UserRepository,
}

impl Identity {
    /// Looks the slice up in the router state.
    ///
    /// # Errors
    ///
    /// Returns a 500 when the slice was never registered.
    pub fn from_state(state: &ApiState) -> Result<&Self, ApiError> {
        state.try_get_slice::<Self>().map_err(ApiError::internal)
    }
}

/// Initializes the identity slice.
///
/// # Errors
///
/// Fails when the JWT settings cannot be turned into a token service.
pub fn init(config: &ApiConfig, database: &Database) -> Result<InitializedSlice, IdentityError> {
    let tokens = TokenService::new(&config.security.jwt).context("Building token service")?;
    let users = UserRepository::new(database.clone());

    tracing::info!(issuer = %config.security.jwt.issuer, "Identity slice initialized");

    Ok(InitializedSlice::new(Identity::new(IdentityInner { tokens, users })))
}

/// `/auth/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::register))
        .routes(routes!(handlers::login))
        .routes(routes!(handlers::refresh))
        .routes(routes!(handlers::me, handlers::update_me))
        .routes(routes!(handlers::logout))
}
