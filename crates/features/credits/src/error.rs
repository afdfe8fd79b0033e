use lvai_database::DatabaseError;
use lvai_kernel::error::{ApiError, ErrorCode};
use std::borrow::Cow;

#[lvai_derive::lvai_error]
pub enum CreditsError {
    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i64, available: i64 },

    /// Ledger amounts are unsigned on the way in; the direction comes from the operation.
    #[error("Invalid ledger amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("User {user_id} not found")]
    UserNotFound { user_id: String },

    #[error("Credits storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal credits error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<CreditsError> for ApiError {
    fn from(err: CreditsError) -> Self {
        match err {
            CreditsError::InsufficientCredits { required, available } => {
                Self::insufficient_credits(required, available)
            },
            CreditsError::InvalidAmount { .. } => {
                Self::bad_request(ErrorCode::InvalidTransaction, err.to_string())
            },
            CreditsError::UserNotFound { .. } => Self::not_found(ErrorCode::UserNotFound, "User not found"),
            other => Self::internal(other),
        }
    }
}
