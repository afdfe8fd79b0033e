use lvai_derive::lvai_error;
use std::borrow::Cow;

#[lvai_error]
pub enum LedgerError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Insufficient credits: need {required}, have {available}")]
    Insufficient { required: i64, available: i64 },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let _ = LedgerError::from("boom");
    let _ = LedgerError::Insufficient { required: 10, available: 0 };
}
