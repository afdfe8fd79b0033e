use lvai_database::DatabaseError;
use lvai_domain::lottery::LotteryType;
use lvai_kernel::error::ApiError;
use std::borrow::Cow;

#[lvai_derive::lvai_error]
pub enum LotteryError {
    /// The draw breaks the game's rules.
    #[error("Invalid draw: {message}")]
    InvalidDraw { message: Cow<'static, str> },

    #[error("Draw {draw_number} of {lottery_type} already exists")]
    DuplicateDraw { lottery_type: LotteryType, draw_number: String },

    #[error("Lottery storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Internal lottery error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<LotteryError> for ApiError {
    fn from(err: LotteryError) -> Self {
        match err {
            LotteryError::InvalidDraw { .. } | LotteryError::DuplicateDraw { .. } => {
                Self::validation(err.to_string())
            },
            other => Self::internal(other),
        }
    }
}
