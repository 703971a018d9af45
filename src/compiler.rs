use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::{
    builtins::Builtins,
    dialect::Dialect,
    error::{Error, ParseError},
    lexer::Lexer,
    lists::materialize_lists,
    order::OrderCompiler,
    output::{Context, OutputNode},
    params::{ParamCounter, QueryParams},
    parser::Parser,
    value::ParamValue,
};

/// A compiled WHERE fragment and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: BTreeMap<String, ParamValue>,
}

impl CompiledQuery {
    /// Join two independently compiled fragments with `AND`.
    ///
    /// Fails if both fragments bind the same placeholder name, which
    /// happens when they were compiled with the same prefix.
    pub fn merge(self, other: CompiledQuery) -> Result<CompiledQuery, Error> {
        let mut params = self.params;

        for (name, value) in other.params {
            if params.contains_key(&name) {
                return Err(Error::ParamCollision(name));
            }
            params.insert(name, value);
        }

        Ok(CompiledQuery {
            sql: format!("({}) AND ({})", self.sql, other.sql),
            params,
        })
    }
}

/// Compiles filter expressions and order-by statements for one dialect and
/// one set of builtins.
///
/// # Examples
///
/// ```
/// use cms_filter::{Builtins, Compiler, Dialect};
///
/// let builtins = Builtins::new().with("published", "n.published");
/// let compiler = Compiler::new(Dialect::Sqlite, builtins);
///
/// let query = compiler.compile("category = 'news' & published = true").unwrap();
///
/// assert_eq!(
///     query.sql,
///     "json_extract(n.content, '$.category.value') = :p0 AND n.published = true"
/// );
/// assert_eq!(query.params["p0"].as_str(), Some("news"));
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    dialect: Dialect,
    builtins: Builtins,
    counter: ParamCounter,
}

impl Compiler {
    pub fn new(dialect: Dialect, builtins: Builtins) -> Self {
        Compiler {
            dialect,
            builtins,
            counter: ParamCounter::default(),
        }
    }

    /// Use `prefix` for placeholder names instead of `p`.
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self, Error> {
        self.counter = ParamCounter::new(prefix)?;
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        self.counter.prefix()
    }

    fn context(&self) -> Context<'_> {
        Context {
            dialect: self.dialect,
            builtins: &self.builtins,
        }
    }

    /// Lex, materialize lists and parse `query` into output nodes.
    pub fn parse(&self, query: &str) -> Result<Vec<OutputNode>, ParseError> {
        let tokens = Lexer::new(query, &self.builtins).tokens()?;
        let tokens = materialize_lists(tokens, query)?;

        debug!(tokens = tokens.len(), "tokenized filter");

        Parser::new(query, tokens, self.context()).parse()
    }

    /// Compile `query` into SQL and parameters using this compiler's prefix.
    pub fn compile(&self, query: &str) -> Result<CompiledQuery, ParseError> {
        let mut params = QueryParams::from(self.counter.clone());
        let sql = self.compile_into(query, &mut params)?;

        Ok(CompiledQuery {
            sql,
            params: params.into_values(),
        })
    }

    /// Compile `query`, binding its values to a caller owned sink. Several
    /// fragments rendered into the same sink never share a placeholder.
    pub fn compile_into(&self, query: &str, params: &mut QueryParams) -> Result<String, ParseError> {
        let nodes = self.parse(query).inspect_err(|e| {
            debug!(dialect = %self.dialect, error = %e.message(), "rejected filter");
        })?;

        let sql = build(&nodes, params);

        debug!(
            dialect = %self.dialect,
            nodes = nodes.len(),
            params = params.len(),
            "compiled filter"
        );

        Ok(sql)
    }

    /// Compile an order-by statement with the same field resolution rules.
    pub fn order(&self, statement: &str) -> Result<String, ParseError> {
        OrderCompiler::new(self.dialect, &self.builtins).compile(statement)
    }
}

/// Render `nodes` in source order. Parentheses hug their contents.
pub fn build(nodes: &[OutputNode], params: &mut QueryParams) -> String {
    let mut sql = String::new();
    let mut after_paren = true;

    for node in nodes {
        let rendered = node.render(params);
        trace!(sql = %rendered, "rendered output node");

        if !after_paren && *node != OutputNode::RightParen {
            sql.push(' ');
        }

        sql.push_str(&rendered);
        after_paren = *node == OutputNode::LeftParen;
    }

    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parens_hug_contents() {
        let compiler = Compiler::new(Dialect::Postgres, Builtins::new());
        let query = compiler.compile("(a = 1 | (b = 2)) & c").unwrap();

        assert_eq!(
            query.sql,
            "(jsonb_path_match(n.content, '$.a.value == 1') OR \
             (jsonb_path_match(n.content, '$.b.value == 2'))) AND jsonb_exists(n.content, 'c')"
        );
    }

    #[test]
    fn test_merge_detects_collisions() {
        let compiler = Compiler::new(Dialect::Sqlite, Builtins::new());
        let a = compiler.compile("a = 'x'").unwrap();
        let b = compiler.compile("b = 'y'").unwrap();

        assert_eq!(a.clone().merge(b), Err(Error::ParamCollision("p0".to_string())));

        let types = compiler.clone().with_prefix("t").unwrap();
        let b = types.compile("b = 'y'").unwrap();
        let merged = a.merge(b).unwrap();

        assert_eq!(
            merged.sql,
            "(json_extract(n.content, '$.a.value') = :p0) AND (json_extract(n.content, '$.b.value') = :t0)"
        );
        assert_eq!(merged.params.len(), 2);
    }
}
