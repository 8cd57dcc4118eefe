//! Command line lexer.
//!
//! Splits one command line into whitespace-separated tokens, honoring
//! double quotes so multi-word text fields (subject, location,
//! description) stay single tokens. Quotes are stripped; there is no
//! escape syntax.

use crate::error::{ParseError, ParseErrorKind, ParseResult};

/// ## Summary
/// Tokenizes one command line.
///
/// ## Errors
/// Returns `UnrecognizedCommand` for an unterminated quote.
pub fn tokenize(line: &str) -> ParseResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut token_open = false;

    for c in line.chars() {
        if c == '"' {
            // Entering or leaving a quoted span; an empty quoted span
            // still produces a token
            in_quotes = !in_quotes;
            token_open = true;
        } else if c.is_whitespace() && !in_quotes {
            if token_open {
                tokens.push(std::mem::take(&mut current));
                token_open = false;
            }
        } else {
            current.push(c);
            token_open = true;
        }
    }

    if in_quotes {
        return Err(ParseError::new(
            ParseErrorKind::UnrecognizedCommand,
            format!("unterminated quote in {line:?}"),
        ));
    }
    if token_open {
        tokens.push(current);
    }

    Ok(tokens)
}
