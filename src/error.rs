//! Error types shared by the lexer, parser, output nodes and compiler.
//!
//! Every problem caused by user supplied query text ends up as a
//! [`ParseError`], which carries a caret diagram pointing at the offending
//! part of the query:
//!
//! ```text
//! Boolean operator at the end of the expression.
//!
//! Query: 1 = 1 |
//!              ^
//! ```

use thiserror::Error;

use crate::ast::Token;

/// A lexical, structural or semantic error in a filter or order-by statement.
///
/// All variants of user error share this single shape so callers can turn
/// it into a bad-request response without inspecting it further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{pointer}")]
pub struct ParseError {
    message: String,
    pointer: String,
}

impl ParseError {
    /// An error pointing at `len` chars starting at char offset `position`
    /// of `source`.
    pub fn new(message: impl Into<String>, source: &str, position: usize, len: usize) -> Self {
        let carets = "^".repeat(len.max(1));
        let pointer = format!(
            "\n\nQuery: {}\n       {}{}",
            source,
            " ".repeat(position),
            carets
        );

        ParseError {
            message: message.into(),
            pointer,
        }
    }

    /// An error pointing at the source span of `token`.
    pub fn at_token(message: impl Into<String>, source: &str, token: &Token) -> Self {
        Self::new(message, source, token.position, token.len)
    }

    /// An error pointing one char past the end of `source`.
    pub fn at_end(message: impl Into<String>, source: &str) -> Self {
        Self::new(message, source, source.chars().count(), 1)
    }

    /// An error without a source pointer.
    pub fn plain(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            pointer: String::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Errors are always caused by the query text, never by the server.
    pub fn is_client_error(&self) -> bool {
        true
    }
}

/// A semantic error detected while constructing an output node.
///
/// Carries the token responsible so the parser can re-raise it as a
/// [`ParseError`] with the correct position.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct OutputError {
    pub message: String,
    pub token: Token,
}

impl OutputError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        OutputError {
            message: message.into(),
            token: token.clone(),
        }
    }

    pub fn into_parse_error(self, source: &str) -> ParseError {
        ParseError::at_token(self.message, source, &self.token)
    }
}

/// Crate level error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Two fragments minted the same placeholder name
    #[error("parameter collision: :{0} is bound by both fragments")]
    ParamCollision(String),

    #[error("invalid parameter prefix '{0}': use letters, digits and underscores")]
    InvalidPrefix(String),

    #[error("unknown dialect '{0}': use pgsql or sqlite")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, Error>;
