//! Command parse error types.

use std::fmt;

/// Result type for command parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while parsing one command line.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an unrecognized-command error echoing the offending line.
    #[must_use]
    pub fn unrecognized(line: &str, reason: &str) -> Self {
        Self::new(
            ParseErrorKind::UnrecognizedCommand,
            format!("{reason} in {line:?}"),
        )
    }

    /// Stable kind name used in `Error: <kind>: <detail>` report lines.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::UnrecognizedCommand => "UnrecognizedCommand",
            ParseErrorKind::MalformedDateTime => "MalformedDateTime",
            ParseErrorKind::InvalidRecurrence => "InvalidRecurrence",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The line does not match any known command shape.
    UnrecognizedCommand,
    /// A date or date-time literal does not match the fixed grammar.
    MalformedDateTime,
    /// A recurrence clause is malformed (weekdays, count).
    InvalidRecurrence,
}
