use cplan_derive::planner_error;
use std::borrow::Cow;

#[planner_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing value{}", format_context(.context))]
    Missing { context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>, DemoError> {
    std::fs::read("/definitely/not/here").context("Reading fixture")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.kind(), "io");
    assert!(err.to_string().contains("(Reading fixture)"));

    let missing: Result<(), DemoError> = Err(DemoError::Missing { context: None });
    let missing = missing.context("Loading plan").unwrap_err();
    assert_eq!(missing.kind(), "missing");
    assert_eq!(missing.to_string(), "Missing value (Loading plan)");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.kind(), "internal");
}
