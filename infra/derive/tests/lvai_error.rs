use lvai_derive::lvai_error;
use std::borrow::Cow;

#[lvai_error]
pub enum ProbeError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("disk gone"))
}

#[test]
fn lvai_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/lvai_error_pass.rs");
}

#[test]
fn context_is_attached_to_source_errors() {
    let err = failing_io().context("reading draws").unwrap_err();
    assert!(matches!(err, ProbeError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (reading draws): disk gone");
}

#[test]
fn context_is_attached_to_own_errors() {
    let result: Result<(), ProbeError> = Err("exploded".into());
    let err = result.context("rebuilding statistics").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (rebuilding statistics): exploded");
}

#[test]
fn variants_without_context_are_left_alone() {
    let result: Result<(), ProbeError> = Err(ProbeError::NotFound { what: "draw".to_owned() });
    let err = result.context("ignored").unwrap_err();
    assert_eq!(err.to_string(), "Not found: draw");
}

#[test]
fn question_mark_converts_sources() {
    fn run() -> Result<(), ProbeError> {
        failing_io()?;
        Ok(())
    }
    assert_eq!(run().unwrap_err().to_string(), "IO error: disk gone");
}
