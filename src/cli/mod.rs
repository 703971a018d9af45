//! CLI support for cms-filter
//!
//! Provides programmatic access to the cmsfilter CLI functionality so the
//! surrounding HTTP and admin tooling can reuse option handling and output
//! formatting.

mod compile;
mod convert;
mod docs;

pub use compile::{CompilerOptions, execute_compile, execute_order};
pub use convert::{builtins_from_json, compiled_to_json, param_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid builtin '{0}': use name=column")]
    InvalidBuiltin(String),

    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'cmsfilter docs' to see available categories.")]
    UnknownCategory(String),
}

impl CliError {
    /// Errors caused by the query itself, as opposed to the invocation.
    pub fn is_query_error(&self) -> bool {
        matches!(self, CliError::Parse(_))
    }
}
