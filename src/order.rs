//! Order-by compilation.
//!
//! ```text
//! title.de desc, published   ->   n.content->'title'->'value'->>'de' DESC,
//!                                 n.published ASC
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    ast::TokenType,
    builtins::Builtins,
    dialect::{Dialect, FieldPath},
    error::ParseError,
    lexer::Lexer,
};

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([a-z][a-z0-9_.\-]*)\s*(asc|desc)?\s*$").expect("static")
});

pub struct OrderCompiler<'a> {
    dialect: Dialect,
    builtins: &'a Builtins,
}

impl<'a> OrderCompiler<'a> {
    pub fn new(dialect: Dialect, builtins: &'a Builtins) -> Self {
        OrderCompiler { dialect, builtins }
    }

    /// Compile a comma separated list of `identifier [asc|desc]`.
    pub fn compile(&self, statement: &str) -> Result<String, ParseError> {
        if statement.trim().is_empty() {
            return Err(ParseError::plain("Empty order by statement"));
        }

        let mut clauses = Vec::new();

        for segment in statement.split(',') {
            let captures = SEGMENT.captures(segment).ok_or_else(|| {
                ParseError::plain(format!("Invalid order by segment: '{}'", segment.trim()))
            })?;

            let ident = &captures[1];
            let direction = match captures.get(2) {
                Some(dir) if dir.as_str().eq_ignore_ascii_case("desc") => "DESC",
                _ => "ASC",
            };

            clauses.push(format!("{} {}", self.resolve(ident)?, direction));
        }

        debug!(dialect = %self.dialect, clauses = clauses.len(), "compiled order by");

        Ok(clauses.join(",\n"))
    }

    /// Identifiers are classified the way the filter lexer does it. Only a
    /// single builtin or a plain content field can be ordered by.
    fn resolve(&self, ident: &str) -> Result<String, ParseError> {
        let tokens = Lexer::new(ident, self.builtins).tokens().ok();

        match tokens.as_deref() {
            Some([token]) if token.is(TokenType::Builtin) => {
                if let Some(column) = self.builtins.column(&token.lexeme) {
                    return Ok(column.to_string());
                }
            }
            Some([token]) if token.is(TokenType::Field) => {
                if let Some(field) = FieldPath::parse(&token.lexeme) {
                    if field.wildcard.is_none() {
                        return Ok(self.dialect.extract_text(&field));
                    }
                }
            }
            _ => {}
        }

        Err(ParseError::plain(format!(
            "Invalid field name in order by statement: '{}'",
            ident
        )))
    }
}

#[test]
fn test_default_direction() {
    let builtins = Builtins::new();
    let order = OrderCompiler::new(Dialect::Sqlite, &builtins)
        .compile("title")
        .unwrap();

    assert_eq!(order, "json_extract(n.content, '$.title.value') ASC");
}
