//! # Filter Language - Tokens
//!
//! This module defines the token model shared by the lexer, the list
//! materializer and the parser of the content filter language.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens with their group, type and source span
//! - **[operators]** - Comparison operator classification and SQL spellings
//!
//! ## Quick Start
//!
//! ```text
//! category = 'news' & (rating > 5 | featured = true)
//! ```
//!
//! This filter selects news nodes that are either highly rated or featured.
//!
//! ## Core Concepts
//!
//! ### Conditions
//!
//! Every condition is one of:
//!
//! - **Comparison** `operand operator operand`
//! - **Null comparison** `field = null`, `field != null`
//! - **Existence check** a bare field name
//! - **URL path condition** `path = '/about'`, `path.de ~~ '/produkte/%'`
//!
//! ### Connectors
//!
//! Conditions are joined with `&` (AND) and `|` (OR) and grouped with
//! parentheses. No precedence is computed: connectors are emitted in source
//! order and the database applies its own AND-before-OR rules.
//!
//! ### Identifiers
//!
//! - `true`, `false`, `null` and `now` are literals or keywords
//! - `path` and `path.<locale>` address the node's URL paths
//! - names registered as builtins map to SQL columns
//! - everything else is a JSON content field: `title`, `title.de`, `title.*`
//!
//! ## Examples
//!
//! ### Lists
//!
//! ```text
//! category @ ['news', 'blog']
//! ```
//!
//! ### Patterns
//!
//! ```text
//! title ~* /^rust/ & summary !~~ '%draft%'
//! ```
pub mod operators;
pub mod tokens;

pub use operators::OperatorClass;
pub use tokens::{Token, TokenGroup, TokenType};
