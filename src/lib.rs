pub mod ast;
pub mod builtins;
pub mod cli;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod lexer;
pub mod lists;
pub mod order;
pub mod output;
pub mod params;
pub mod parser;
pub mod value;

pub use ast::{Token, TokenGroup, TokenType};
pub use builtins::Builtins;
pub use compiler::{CompiledQuery, Compiler};
pub use dialect::Dialect;
pub use error::{Error, OutputError, ParseError};
pub use lexer::Lexer;
pub use lists::materialize_lists;
pub use order::OrderCompiler;
pub use output::OutputNode;
pub use params::{ParamCounter, QueryParams};
pub use parser::Parser;
pub use value::ParamValue;
