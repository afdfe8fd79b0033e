use crate::Identity;
use crate::extract::{CurrentUser, rejection_error};
use crate::models::{
    AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::password::{hash_password, verify_password};
use crate::repository::{AccountConflict, UserRecord};
use crate::token::TokenKind;
use axum::Json;
use axum::extract::State;
use lvai_domain::constants::AUTH_TAG;
use lvai_kernel::error::ErrorEnvelope;
use lvai_kernel::prelude::*;
use tracing::info;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn conflict_error(conflict: AccountConflict) -> ApiError {
    match conflict {
        AccountConflict::Email => {
            ApiError::bad_request(ErrorCode::EmailExists, "Email is already registered")
        }
        AccountConflict::Username => {
            ApiError::bad_request(ErrorCode::UsernameExists, "Username is already taken")
        }
    }
}

#[api_handler(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = OK, description = "Account created", body = AuthResponse),
        (status = BAD_REQUEST, description = "Invalid input or duplicate account", body = ErrorEnvelope),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn register(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    body.validate()?;
    let identity = Identity::from_state(&state)?;
    let email = normalize_email(&body.email);
    let username = body.username.trim().to_owned();

    if let Some(conflict) =
        identity.users.conflict(&email, &username).await.map_err(ApiError::internal)?
    {
        return Err(conflict_error(conflict));
    }

    let password_hash = hash_password(&body.password)?;
    let record =
        UserRecord::new(email.clone(), username.clone(), password_hash, body.full_name, now_millis());
    let user = match identity.users.create(record, state.config.credits.initial).await {
        Ok(user) => user,
        // A concurrent registration can claim the email or username after the check above;
        // the unique index rejects the insert.
        Err(err) => {
            return Err(
                match identity.users.conflict(&email, &username).await.map_err(ApiError::internal)? {
                    Some(conflict) => conflict_error(conflict),
                    None => ApiError::internal(err),
                },
            );
        }
    };

    info!(user_id = %user.uid, credits = user.credits, "User registered");

    let token = identity.tokens.issue_pair(&user.uid)?;
    Ok(Json(AuthResponse {
        success: true,
        message: "Registration successful".to_owned(),
        user: UserResponse::from(&user),
        token: token.into(),
    }))
}

#[api_handler(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Signed in", body = AuthResponse),
        (status = UNAUTHORIZED, description = "Wrong credentials or disabled account", body = ErrorEnvelope),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn login(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let identity = Identity::from_state(&state)?;
    let email = normalize_email(&body.email);

    let user = identity
        .users
        .find_by_email(&email)
        .await
        .map_err(ApiError::internal)?
        .filter(|user| verify_password(&body.password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized(ErrorCode::InvalidCredentials, INVALID_CREDENTIALS))?;

    if !user.is_active {
        return Err(ApiError::unauthorized(ErrorCode::UserInactive, "Account is disabled"));
    }

    let now = now_millis();
    identity.users.record_login(&user.uid, now).await.map_err(ApiError::internal)?;
    let user = UserRecord { last_login_at: Some(now), updated_at: now, ..user };

    info!(user_id = %user.uid, "User logged in");

    let token = identity.tokens.issue_pair(&user.uid)?;
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_owned(),
        user: UserResponse::from(&user),
        token: token.into(),
    }))
}

#[api_handler(
    post,
    path = "/refresh",
    request_body = RefreshRequest,
    responses(
        (status = OK, description = "New token pair", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Refresh token rejected", body = ErrorEnvelope),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn refresh(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let identity = Identity::from_state(&state)?;
    let invalid = || rejection_error(crate::token::TokenRejection::Invalid);

    let claims = identity
        .tokens
        .verify(&body.refresh_token, TokenKind::Refresh)
        .map_err(|_| invalid())?;

    let user = identity
        .users
        .find_by_id(&claims.sub)
        .await
        .map_err(ApiError::internal)?
        .filter(|user| user.is_active)
        .ok_or_else(invalid)?;

    Ok(Json(identity.tokens.issue_pair(&user.uid)?.into()))
}

#[api_handler(
    get,
    path = "/me",
    responses(
        (status = OK, description = "Current profile", body = UserResponse),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn me(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&current.user))
}

#[api_handler(
    patch,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = OK, description = "Updated profile", body = UserResponse),
        (status = BAD_REQUEST, body = ErrorEnvelope),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn update_me(
    State(state): State<ApiState>,
    current: CurrentUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    body.validate()?;
    let identity = Identity::from_state(&state)?;

    let user = identity
        .users
        .update_profile(current.id(), body.full_name, body.avatar_url, now_millis())
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound, "User not found"))?;

    Ok(Json(UserResponse::from(&user)))
}

#[api_handler(
    post,
    path = "/logout",
    responses(
        (status = OK, description = "Access token revoked", body = MessageResponse),
        (status = UNAUTHORIZED, body = ErrorEnvelope),
    ),
    security(("bearer" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn logout(
    State(state): State<ApiState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    Identity::from_state(&state)?.tokens.revoke(&current.claims);
    info!(user_id = %current.id(), "User logged out");

    Ok(Json(MessageResponse { success: true, message: "Logged out".to_owned() }))
}
