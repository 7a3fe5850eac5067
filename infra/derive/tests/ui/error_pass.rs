use stackline_derive::stackline_error;
use std::borrow::Cow;

#[stackline_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err::<(), _>(std::io::Error::other("disk gone")).context("reading frames")?;
    Ok(())
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert_eq!(err.context_message(), Some("reading frames"));

    let internal: DemoError = "broken".into();
    assert_eq!(internal.kind(), "Internal");
    assert_eq!(internal.context_message(), None);
}
