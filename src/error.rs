use std::fmt;
use std::io;
use std::string::FromUtf8Error;

/// The type of error that can abort a fuzzing run.
#[derive(Debug)]
pub struct Error(pub(crate) ErrorRepr);

#[derive(Debug)]
pub(crate) enum ErrorRepr {
    /// Could not spawn or talk to the external parser process. Distinct
    /// from the parser rejecting an input, which is a `Verdict`, not an
    /// error.
    Parser(io::Error),
    /// The parser wrote non-UTF-8 bytes where a serialized tree was expected.
    Utf8(FromUtf8Error),
    /// A generator draw failed. Generators are total over their draws, so
    /// this indicates a defect in the generator itself.
    Generation(arbitrary::Error),
    /// The configured parser command line had no program.
    EmptyCommand,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.0 {
            ErrorRepr::Parser(e) => Some(e),
            ErrorRepr::Utf8(e) => Some(e),
            ErrorRepr::Generation(e) => Some(e),
            ErrorRepr::EmptyCommand => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            ErrorRepr::Parser(e) => write!(f, "external parser invocation failed: {}", e),
            ErrorRepr::Utf8(e) => write!(f, "external parser output was not UTF-8: {}", e),
            ErrorRepr::Generation(e) => write!(f, "shortcode generation failed: {}", e),
            ErrorRepr::EmptyCommand => write!(f, "parser command line is empty"),
        }
    }
}

impl From<arbitrary::Error> for Error {
    fn from(e: arbitrary::Error) -> Self {
        Self(ErrorRepr::Generation(e))
    }
}
