//! Output nodes: typed fragments of the compiled WHERE clause.
//!
//! The parser emits one node per condition or connector. Conditions resolve
//! their operands when they are constructed and render themselves to SQL
//! for their dialect once [`OutputNode::render`] is called:
//!
//! ```text
//! title.de ~~ '%rust%' & (rating > 5 | path.de = '/blog')
//!
//! Comparison  Operator(AND)  LeftParen  Comparison  Operator(OR)  UrlPath  RightParen
//! ```
//!
//! Construction errors are [`OutputError`]s carrying the responsible token.

use crate::{
    ast::{OperatorClass, Token, TokenType},
    builtins::Builtins,
    dialect::{Dialect, FieldPath, quote_json_path, quote_sql},
    error::OutputError,
    params::QueryParams,
    value::ParamValue,
};

/// What output nodes need to know about the query context.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub dialect: Dialect,
    pub builtins: &'a Builtins,
}

/// A resolved operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// JSON content field
    Field(FieldPath),
    /// SQL column expression of a builtin
    Column(String),
    String(String),
    /// Number lexeme, inlined as written
    Number(String),
    Boolean(bool),
    /// The `now` keyword
    Now,
    List(Vec<ParamValue>),
}

impl Operand {
    fn is_literal(&self) -> bool {
        matches!(
            self,
            Operand::String(_) | Operand::Number(_) | Operand::Boolean(_) | Operand::List(_)
        )
    }

    fn wildcard_field(&self) -> bool {
        matches!(self, Operand::Field(f) if f.wildcard.is_some())
    }
}

/// `left <op> right`. The left side is a field, a builtin or a number or
/// boolean literal; only [`Comparison::new`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    dialect: Dialect,
    left: Operand,
    operator: TokenType,
    right: Operand,
}

/// `left IS [NOT] NULL`. The left side is a field or a builtin.
#[derive(Debug, Clone, PartialEq)]
pub struct NullComparison {
    dialect: Dialect,
    left: Operand,
    negated: bool,
}

/// A bare field: true if the node content has it.
#[derive(Debug, Clone, PartialEq)]
pub struct Exists {
    pub dialect: Dialect,
    pub field: FieldPath,
}

/// Condition on the node's active URL paths.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlPath {
    pub dialect: Dialect,
    pub operator: TokenType,
    pub value: Operand,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputNode {
    Comparison(Comparison),
    NullComparison(NullComparison),
    Exists(Exists),
    UrlPath(UrlPath),
    /// `AND` or `OR`
    Operator(TokenType),
    LeftParen,
    RightParen,
}

impl OutputNode {
    /// Build the node for `left operator right`.
    pub fn condition(
        left: &Token,
        operator: &Token,
        right: &Token,
        ctx: Context<'_>,
    ) -> Result<OutputNode, OutputError> {
        if right.is(TokenType::Null) {
            return NullComparison::new(left, operator, ctx).map(OutputNode::NullComparison);
        }

        if left.is(TokenType::Path) || right.is(TokenType::Path) {
            return UrlPath::new(left, operator, right, ctx).map(OutputNode::UrlPath);
        }

        Comparison::new(left, operator, right, ctx).map(OutputNode::Comparison)
    }

    /// Build the node for a lone operand.
    pub fn exists(token: &Token, ctx: Context<'_>) -> Result<OutputNode, OutputError> {
        Exists::new(token, ctx).map(OutputNode::Exists)
    }

    pub fn connector(token: &Token) -> OutputNode {
        match token.kind {
            TokenType::LeftParen => OutputNode::LeftParen,
            TokenType::RightParen => OutputNode::RightParen,
            kind => OutputNode::Operator(kind),
        }
    }

    /// Render the node to SQL, binding its values to `params`.
    ///
    /// Every call mints new placeholder names, so each node is rendered
    /// exactly once per statement.
    pub fn render(&self, params: &mut QueryParams) -> String {
        match self {
            OutputNode::Comparison(node) => node.render(params),
            OutputNode::NullComparison(node) => node.render(),
            OutputNode::Exists(node) => node.render(),
            OutputNode::UrlPath(node) => node.render(params),
            OutputNode::Operator(TokenType::Or) => "OR".to_string(),
            OutputNode::Operator(_) => "AND".to_string(),
            OutputNode::LeftParen => "(".to_string(),
            OutputNode::RightParen => ")".to_string(),
        }
    }
}

fn fulltext_error(token: &Token) -> OutputError {
    OutputError::new("Fulltext search is not supported in filter conditions", token)
}

/// Resolve the left side of a condition. Numbers and booleans are only
/// accepted by plain comparisons (`1 = 1`).
fn resolve_left(token: &Token, ctx: Context<'_>, literals: bool) -> Result<Operand, OutputError> {
    match token.kind {
        TokenType::Field => parse_field(token).map(Operand::Field),
        TokenType::Builtin => resolve_builtin(token, ctx),
        TokenType::Number if literals => Ok(Operand::Number(token.lexeme.clone())),
        TokenType::Boolean if literals => Ok(Operand::Boolean(token.lexeme == "true")),
        TokenType::Null => Err(OutputError::new(
            "Null is not allowed on the left side of a condition",
            token,
        )),
        TokenType::Fulltext => Err(fulltext_error(token)),
        _ if literals => Err(OutputError::new(
            "Only fields, builtins, numbers or booleans are allowed on the left side of a condition",
            token,
        )),
        _ => Err(OutputError::new(
            "Only fields or builtins can be compared with null",
            token,
        )),
    }
}

fn resolve_right(token: &Token, ctx: Context<'_>) -> Result<Operand, OutputError> {
    match token.kind {
        TokenType::Field => parse_field(token).map(Operand::Field),
        TokenType::Builtin => resolve_builtin(token, ctx),
        TokenType::String => Ok(Operand::String(token.lexeme.clone())),
        TokenType::Number => Ok(Operand::Number(token.lexeme.clone())),
        TokenType::Boolean => Ok(Operand::Boolean(token.lexeme == "true")),
        TokenType::Keyword => Ok(Operand::Now),
        TokenType::List => token
            .items
            .iter()
            .map(list_item)
            .collect::<Result<Vec<_>, _>>()
            .map(Operand::List),
        TokenType::Fulltext => Err(fulltext_error(token)),
        _ => Err(OutputError::new("Invalid value on the right side of a condition", token)),
    }
}

fn parse_field(token: &Token) -> Result<FieldPath, OutputError> {
    FieldPath::parse(&token.lexeme)
        .ok_or_else(|| OutputError::new("Invalid field name", token))
}

fn resolve_builtin(token: &Token, ctx: Context<'_>) -> Result<Operand, OutputError> {
    ctx.builtins
        .column(&token.lexeme)
        .map(|column| Operand::Column(column.to_string()))
        .ok_or_else(|| OutputError::new("Unknown builtin", token))
}

fn list_item(token: &Token) -> Result<ParamValue, OutputError> {
    match token.kind {
        TokenType::String => Ok(ParamValue::String(token.lexeme.clone())),
        TokenType::Boolean => Ok(ParamValue::Boolean(token.lexeme == "true")),
        TokenType::Number => Ok(ParamValue::Number(token.lexeme.clone())),
        _ => Err(OutputError::new(
            "Lists may only contain strings, numbers and booleans",
            token,
        )),
    }
}

/// Operator/value compatibility shared by comparisons and URL paths.
fn check_operator(
    operator: &Token,
    value_token: &Token,
    value: &Operand,
) -> Result<OperatorClass, OutputError> {
    let class = operator
        .kind
        .operator_class()
        .ok_or_else(|| OutputError::new("Expected a comparison operator", operator))?;

    match (class, value) {
        (OperatorClass::Set, Operand::List(_)) => Ok(class),
        (OperatorClass::Set, _) => Err(OutputError::new(
            "The in (@) and not in (!@) operators require a list, e.g. ['a', 'b']",
            value_token,
        )),
        (_, Operand::List(_)) => Err(OutputError::new(
            "Lists are only allowed with the in (@) and not in (!@) operators",
            value_token,
        )),
        (OperatorClass::Like | OperatorClass::Regex, Operand::String(_))
        | (OperatorClass::Like | OperatorClass::Regex, Operand::Field(_))
        | (OperatorClass::Like | OperatorClass::Regex, Operand::Column(_)) => Ok(class),
        (OperatorClass::Like, _) => Err(OutputError::new(
            format!("The operator '{}' requires a string pattern", operator.kind.symbol()),
            value_token,
        )),
        (OperatorClass::Regex, _) => Err(OutputError::new(
            format!(
                "The operator '{}' requires a regular expression string",
                operator.kind.symbol()
            ),
            value_token,
        )),
        (OperatorClass::Comparison, _) => Ok(class),
    }
}

/// Right hand side SQL: strings and list items are bound, everything else
/// is an SQL expression or inlined literal.
fn render_rhs(dialect: Dialect, value: &Operand, params: &mut QueryParams) -> String {
    match value {
        Operand::String(s) => params.add(s.as_str()),
        Operand::Number(n) => n.clone(),
        Operand::Boolean(b) => b.to_string(),
        Operand::Now => dialect.now().to_string(),
        Operand::Column(column) => column.clone(),
        Operand::Field(field) => dialect.extract_text(field),
        Operand::List(items) => {
            let placeholders: Vec<String> =
                items.iter().map(|item| params.add(item.clone())).collect();
            format!("({})", placeholders.join(", "))
        }
    }
}

/// `expr <op> rhs` using plain SQL operators of the dialect.
fn render_sql(
    dialect: Dialect,
    expr: &str,
    operator: TokenType,
    value: &Operand,
    params: &mut QueryParams,
) -> String {
    let rhs = render_rhs(dialect, value, params);
    apply_operator(dialect, expr, operator, &rhs)
}

fn apply_operator(dialect: Dialect, expr: &str, operator: TokenType, rhs: &str) -> String {
    let negated = operator.is_negated();
    let case_insensitive = operator.is_case_insensitive();

    match operator.operator_class() {
        Some(OperatorClass::Like) => dialect.like(expr, negated, case_insensitive, rhs),
        Some(OperatorClass::Regex) => dialect.regex(expr, negated, case_insensitive, rhs),
        Some(OperatorClass::Set) if negated => format!("{} NOT IN {}", expr, rhs),
        Some(OperatorClass::Set) => format!("{} IN {}", expr, rhs),
        _ => format!(
            "{} {} {}",
            expr,
            operator.sql_comparison().unwrap_or("="),
            rhs
        ),
    }
}

/// `EXISTS (SELECT 1 FROM <each> WHERE <item> <op> rhs)` for wildcard fields.
///
/// SQLite binds every literal compared with the items, numbers and booleans
/// included.
fn render_each(
    dialect: Dialect,
    field: &FieldPath,
    operator: TokenType,
    value: &Operand,
    params: &mut QueryParams,
) -> String {
    let rhs = match (dialect, value) {
        (Dialect::Sqlite, Operand::Number(n)) => params.add(ParamValue::Number(n.clone())),
        (Dialect::Sqlite, Operand::Boolean(b)) => params.add(*b),
        _ => render_rhs(dialect, value, params),
    };

    format!(
        "EXISTS (SELECT 1 FROM {} WHERE {})",
        dialect.each(field),
        apply_operator(dialect, dialect.each_item(), operator, &rhs)
    )
}

impl Comparison {
    pub fn new(
        left: &Token,
        operator: &Token,
        right: &Token,
        ctx: Context<'_>,
    ) -> Result<Self, OutputError> {
        let left_operand = resolve_left(left, ctx, true)?;
        let right_operand = resolve_right(right, ctx)?;
        let class = check_operator(operator, right, &right_operand)?;

        if right_operand.wildcard_field() {
            return Err(OutputError::new(
                "Wildcard fields are not allowed on the right side of a condition",
                right,
            ));
        }

        if left_operand.wildcard_field() && !right_operand.is_literal() {
            return Err(OutputError::new(
                "Wildcard fields can only be compared with literal values",
                right,
            ));
        }

        if right_operand == Operand::Now && class != OperatorClass::Comparison {
            return Err(OutputError::new(
                "The keyword 'now' can only be used with =, !=, <, <=, > and >=",
                right,
            ));
        }

        Ok(Comparison {
            dialect: ctx.dialect,
            left: left_operand,
            operator: operator.kind,
            right: right_operand,
        })
    }

    pub fn left(&self) -> &Operand {
        &self.left
    }

    pub fn operator(&self) -> TokenType {
        self.operator
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    pub fn render(&self, params: &mut QueryParams) -> String {
        match &self.left {
            Operand::Field(field) => match self.dialect {
                Dialect::Postgres => self.render_postgres_field(field, params),
                Dialect::Sqlite => self.render_sqlite_field(field, params),
            },
            Operand::Column(column) => {
                render_sql(self.dialect, column, self.operator, &self.right, params)
            }
            Operand::Number(n) => render_sql(self.dialect, n, self.operator, &self.right, params),
            Operand::Boolean(b) => {
                render_sql(self.dialect, &b.to_string(), self.operator, &self.right, params)
            }
            _ => unreachable!("left operand is a field, column, number or boolean"),
        }
    }

    fn render_postgres_field(&self, field: &FieldPath, params: &mut QueryParams) -> String {
        let dialect = self.dialect;
        let class = self.operator.operator_class();

        match (&self.right, class) {
            (
                Operand::String(_) | Operand::Number(_) | Operand::Boolean(_),
                Some(OperatorClass::Comparison),
            ) => {
                let op = self.operator.jsonpath_comparison().unwrap_or("==");
                let predicate = format!(
                    "{} {} {}",
                    field.json_path(),
                    op,
                    json_path_literal(&self.right)
                );
                format!("jsonb_path_match(n.content, {})", quote_sql(&predicate))
            }
            (Operand::String(pattern), Some(OperatorClass::Regex)) => {
                let flag = if self.operator.is_case_insensitive() {
                    " flag \"i\""
                } else {
                    ""
                };
                let predicate = format!(
                    "{} ? (@ like_regex {}{})",
                    field.json_path(),
                    quote_json_path(pattern),
                    flag
                );
                let not = if self.operator.is_negated() { "NOT " } else { "" };
                format!("{}jsonb_path_exists(n.content, {})", not, quote_sql(&predicate))
            }
            (Operand::Now, _) => format!(
                "({})::timestamptz {} {}",
                dialect.extract_text(field),
                self.operator.sql_comparison().unwrap_or("="),
                dialect.now()
            ),
            (Operand::Field(other), Some(OperatorClass::Comparison)) => format!(
                "{} {} {}",
                dialect.extract_json(field),
                self.operator.sql_comparison().unwrap_or("="),
                dialect.extract_json(other)
            ),
            _ if field.wildcard.is_some() => {
                render_each(dialect, field, self.operator, &self.right, params)
            }
            _ => render_sql(
                dialect,
                &dialect.extract_text(field),
                self.operator,
                &self.right,
                params,
            ),
        }
    }

    fn render_sqlite_field(&self, field: &FieldPath, params: &mut QueryParams) -> String {
        if field.wildcard.is_some() {
            render_each(self.dialect, field, self.operator, &self.right, params)
        } else {
            render_sql(
                self.dialect,
                &self.dialect.extract_text(field),
                self.operator,
                &self.right,
                params,
            )
        }
    }
}

/// A literal inlined into a JSONPath predicate.
fn json_path_literal(value: &Operand) -> String {
    match value {
        Operand::String(s) => quote_json_path(s),
        Operand::Number(n) => n.clone(),
        Operand::Boolean(b) => b.to_string(),
        _ => String::new(),
    }
}

impl NullComparison {
    pub fn new(left: &Token, operator: &Token, ctx: Context<'_>) -> Result<Self, OutputError> {
        if left.is(TokenType::Path) {
            return Err(OutputError::new("The path cannot be compared with null", left));
        }

        let left_operand = resolve_left(left, ctx, false)?;

        if left_operand.wildcard_field() {
            return Err(OutputError::new(
                "Wildcard fields cannot be compared with null",
                left,
            ));
        }

        let negated = match operator.kind {
            TokenType::Equal => false,
            TokenType::Unequal => true,
            _ => {
                return Err(OutputError::new(
                    "Only equal or unequal operators are allowed when comparing with null",
                    operator,
                ));
            }
        };

        Ok(NullComparison {
            dialect: ctx.dialect,
            left: left_operand,
            negated,
        })
    }

    pub fn left(&self) -> &Operand {
        &self.left
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn render(&self) -> String {
        let expr = match &self.left {
            Operand::Field(field) => self.dialect.extract_text(field),
            Operand::Column(column) => column.clone(),
            _ => unreachable!("left operand is resolved to a field or column"),
        };

        if self.negated {
            format!("{} IS NOT NULL", expr)
        } else {
            format!("{} IS NULL", expr)
        }
    }
}

impl Exists {
    pub fn new(token: &Token, ctx: Context<'_>) -> Result<Self, OutputError> {
        match token.kind {
            TokenType::Field => Ok(Exists {
                dialect: ctx.dialect,
                field: parse_field(token)?,
            }),
            TokenType::Builtin => Err(OutputError::new(
                "Builtins cannot be used as an existence check, compare them with a value",
                token,
            )),
            TokenType::Path => Err(OutputError::new(
                "The path cannot be used as an existence check, compare it with a string",
                token,
            )),
            TokenType::Fulltext => Err(fulltext_error(token)),
            _ => Err(OutputError::new(
                "Only fields can be used as an existence check",
                token,
            )),
        }
    }

    pub fn render(&self) -> String {
        self.dialect.exists(&self.field)
    }
}

impl UrlPath {
    pub fn new(
        left: &Token,
        operator: &Token,
        right: &Token,
        ctx: Context<'_>,
    ) -> Result<Self, OutputError> {
        let (path, value_token, operator_kind) = if left.is(TokenType::Path) {
            (left, right, operator.kind)
        } else {
            if operator.kind.operator_class() != Some(OperatorClass::Comparison) {
                return Err(OutputError::new(
                    "With the path on the right side only =, !=, <, <=, > and >= are allowed",
                    operator,
                ));
            }
            (right, left, operator.kind.mirrored())
        };

        let value = match value_token.kind {
            TokenType::String => Operand::String(value_token.lexeme.clone()),
            TokenType::List => resolve_right(value_token, ctx)?,
            _ => {
                return Err(OutputError::new(
                    "The path can only be compared with strings",
                    value_token,
                ));
            }
        };

        check_operator(operator, value_token, &value)?;

        let locale = match path.lexeme.split('.').collect::<Vec<_>>().as_slice() {
            ["path"] | ["path", "*"] | ["path", "?"] => None,
            ["path", locale] => Some(locale.to_string()),
            _ => {
                return Err(OutputError::new(
                    "Invalid path identifier, use 'path' or 'path.<locale>'",
                    path,
                ));
            }
        };

        Ok(UrlPath {
            dialect: ctx.dialect,
            operator: operator_kind,
            value,
            locale,
        })
    }

    pub fn render(&self, params: &mut QueryParams) -> String {
        let condition = render_sql(self.dialect, "up.path", self.operator, &self.value, params);

        let mut sql = format!(
            "EXISTS (SELECT 1 FROM {} up WHERE up.node = n.node AND up.inactive IS NULL AND {}",
            self.dialect.table("urlpaths"),
            condition
        );

        if let Some(locale) = &self.locale {
            sql.push_str(" AND up.locale = ");
            sql.push_str(&params.add(locale.as_str()));
        }

        sql.push(')');
        sql
    }
}
