//! Invokes the external parser and compares its tree against the expectation.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, ErrorRepr};
use crate::node::{NodeKind, Token};

/// Outcome of checking one generated instance against the external parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match,
    /// The parser produced a structurally different tree. This is the
    /// primary signal the tool exists to surface.
    Mismatch {
        input: String,
        expected: String,
        actual: String,
    },
    /// The parser exited non-zero, whatever it wrote to stdout.
    ProcessFailure {
        input: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// Wraps generated instances and drives one external-parser invocation per
/// instance, no retries.
///
/// The parser command must read source text on stdin and print a
/// parenthesized, range-free tree of node tags on stdout. Comparison is
/// canonical: all whitespace is stripped from both the expectation and the
/// parser's output before an exact equality check.
#[derive(Debug, Clone)]
pub struct Oracle {
    program: String,
    args: Vec<String>,
}

impl Oracle {
    /// `argv` is the full parser command line, program first.
    pub fn new(argv: Vec<String>) -> Result<Self, Error> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(Error(ErrorRepr::EmptyCommand))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    /// Feeds `case.text` to the parser and compares the serialized trees.
    ///
    /// The expected encoding is wrapped in the `inline` container first,
    /// mirroring the embedding context the document grammar parses inline
    /// content in. Blocking, one invocation, no timeout.
    pub fn check(&self, case: &Token) -> Result<Verdict, Error> {
        let expected = normalize(&wrap_inline(&case.sexp));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error(ErrorRepr::Parser(e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(case.text.as_bytes())
                .map_err(|e| Error(ErrorRepr::Parser(e)))?;
            // dropping stdin closes the pipe so the parser sees EOF
        }
        let output = child
            .wait_with_output()
            .map_err(|e| Error(ErrorRepr::Parser(e)))?;

        if !output.status.success() {
            return Ok(Verdict::ProcessFailure {
                input: case.text.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| Error(ErrorRepr::Utf8(e)))?;
        let actual = normalize(&stdout);
        if actual == expected {
            Ok(Verdict::Match)
        } else {
            Ok(Verdict::Mismatch {
                input: case.text.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Wraps an encoding in the top-level `inline` container node.
pub fn wrap_inline(sexp: &str) -> String {
    format!("({}{})", NodeKind::Inline.as_str(), sexp)
}

/// Canonical comparison form: every whitespace character removed.
pub fn normalize(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
