use crate::Identity;
use crate::repository::UserRecord;
use crate::token::{Claims, TokenKind, TokenRejection};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use lvai_kernel::prelude::*;
use tracing::debug;

/// The account behind a valid `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserRecord,
    pub claims: Claims,
}

impl CurrentUser {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.uid
    }
}

/// A [`CurrentUser`] with superuser rights.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_state(state)?;

        let claims = {
            let token = bearer_token(parts).ok_or_else(|| {
                ApiError::unauthorized(ErrorCode::TokenInvalid, "Missing bearer token")
            })?;
            identity.tokens.verify(token, TokenKind::Access).map_err(|rejection| {
                debug!(?rejection, "Access token rejected");
                rejection_error(rejection)
            })?
        };

        let user = identity
            .users
            .find_by_id(&claims.sub)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::unauthorized(ErrorCode::UserNotFound, "User not found"))?;

        if !user.is_active {
            return Err(ApiError::unauthorized(ErrorCode::UserInactive, "Account is disabled"));
        }

        Ok(Self { user, claims })
    }
}

impl FromRequestParts<ApiState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.is_superuser {
            return Err(ApiError::forbidden("Administrator rights required"));
        }
        Ok(Self(current))
    }
}

pub(crate) fn rejection_error(rejection: TokenRejection) -> ApiError {
    match rejection {
        TokenRejection::Expired => ApiError::unauthorized(ErrorCode::TokenExpired, "Token has expired"),
        TokenRejection::Invalid => ApiError::unauthorized(ErrorCode::TokenInvalid, "Invalid token"),
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
