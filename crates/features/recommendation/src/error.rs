use lvai_database::DatabaseError;
use lvai_kernel::error::ApiError;
use std::borrow::Cow;

#[lvai_derive::lvai_error]
pub enum RecommendationError {
    /// The completion endpoint could not produce a rationale.
    #[error("AI service error: {message}")]
    Ai { message: Cow<'static, str> },

    #[error("Recommendation storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal recommendation error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        Self::internal(err)
    }
}
