use lvai_database::DatabaseError;
use lvai_kernel::error::ApiError;
use std::borrow::Cow;

#[lvai_derive::lvai_error]
pub enum IdentityError {
    #[error("Identity config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Identity storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    /// Hashing failed; verification failures are not errors.
    #[error("Password hashing error{}: {message}", format_context(.context))]
    Password { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Token signing error{}: {message}", format_context(.context))]
    Signing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::internal(err)
    }
}
