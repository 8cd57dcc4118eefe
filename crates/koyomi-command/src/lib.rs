pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::{Command, parse};
