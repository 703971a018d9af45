//! SQL dialect primitives for PostgreSQL (JSONB) and SQLite (JSON1).
//!
//! Node content lives in the `content` column of the node table aliased
//! `n`. Every field is stored as an object with a `value` member, which
//! holds either a scalar or a map of locales:
//!
//! ```text
//! {"title": {"type": "text", "value": {"de": "Titel", "en": "Title"}}}
//! ```

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl FromStr for Dialect {
    type Err = Error;

    /// Accepts driver names as well as the common spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pgsql" | "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(Error::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "pgsql"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Trailing wildcard of a field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcard {
    /// `field.*`, any member of an object
    Any,
    /// `field.?`, any element of an array
    Element,
}

/// A JSON content field: `title`, `title.de`, `tags.?`.
///
/// The first segment names the field, the remaining segments address the
/// inside of its `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub name: String,
    pub segments: Vec<String>,
    pub wildcard: Option<Wildcard>,
}

impl FieldPath {
    /// Split and validate a field identifier. `None` if it is not a
    /// structurally valid field name.
    pub fn parse(ident: &str) -> Option<Self> {
        let mut parts: Vec<&str> = ident.split('.').collect();

        let wildcard = match parts.last().copied() {
            Some("*") => Some(Wildcard::Any),
            Some("?") => Some(Wildcard::Element),
            _ => None,
        };
        if wildcard.is_some() {
            parts.pop();
        }

        let (name, segments) = parts.split_first()?;

        if !name.chars().next().is_some_and(char::is_alphabetic) {
            return None;
        }

        if !std::iter::once(name)
            .chain(segments.iter())
            .all(|part| is_valid_segment(part))
        {
            return None;
        }

        Some(FieldPath {
            name: name.to_string(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
            wildcard,
        })
    }

    /// A bare field name without segments or wildcard.
    pub fn is_plain(&self) -> bool {
        self.segments.is_empty() && self.wildcard.is_none()
    }

    /// `$.name.value.seg`, without the wildcard.
    pub fn container_json_path(&self) -> String {
        let mut path = format!("$.{}.value", json_path_key(&self.name));

        for segment in &self.segments {
            path.push('.');
            path.push_str(&json_path_key(segment));
        }

        path
    }

    /// `$.name.value.seg` followed by `.*` or `[*]` for wildcards.
    pub fn json_path(&self) -> String {
        let mut path = self.container_json_path();

        match self.wildcard {
            Some(Wildcard::Any) => path.push_str(".*"),
            Some(Wildcard::Element) => path.push_str("[*]"),
            None => {}
        }

        path
    }
}

fn is_valid_segment(part: &str) -> bool {
    part.chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
        && part
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Keys that are not plain identifiers are quoted inside JSON paths.
fn json_path_key(key: &str) -> String {
    let plain = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if plain {
        key.to_string()
    } else {
        format!("\"{}\"", key)
    }
}

/// Quote `s` as a SQL string literal.
pub fn quote_sql(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote `s` as a JSONPath string literal. The result still has to be
/// embedded in a SQL string literal with [`quote_sql`].
pub fn quote_json_path(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');

    for ch in s.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

impl Dialect {
    /// Qualified name of a CMS table.
    pub fn table(self, name: &str) -> String {
        match self {
            Dialect::Postgres => format!("cms.{}", name),
            Dialect::Sqlite => format!("cms_{}", name),
        }
    }

    fn postgres_chain(field: &FieldPath, text: bool) -> String {
        let mut keys = vec![field.name.as_str(), "value"];
        keys.extend(field.segments.iter().map(String::as_str));

        let mut expr = String::from("n.content");
        let last = keys.len() - 1;

        for (i, key) in keys.iter().enumerate() {
            let arrow = if text && i == last { "->>" } else { "->" };
            expr.push_str(arrow);
            expr.push_str(&quote_sql(key));
        }

        expr
    }

    /// Expression yielding the field value as SQL text (SQLite: as the
    /// native SQL value). Ignores wildcards.
    pub fn extract_text(self, field: &FieldPath) -> String {
        match self {
            Dialect::Postgres => Self::postgres_chain(field, true),
            Dialect::Sqlite => format!(
                "json_extract(n.content, {})",
                quote_sql(&field.container_json_path())
            ),
        }
    }

    /// Expression yielding the field value as a JSON value, for comparing
    /// two fields with each other.
    pub fn extract_json(self, field: &FieldPath) -> String {
        match self {
            Dialect::Postgres => Self::postgres_chain(field, false),
            Dialect::Sqlite => self.extract_text(field),
        }
    }

    /// Table valued source iterating the members of a wildcard field.
    ///
    /// Both sources yield nothing when the value is missing or not a
    /// container. PostgreSQL walks the lax JSONPath of the field.
    pub fn each(self, field: &FieldPath) -> String {
        match self {
            Dialect::Postgres => format!(
                "jsonb_path_query(n.content, {}) AS w(value)",
                quote_sql(&field.json_path())
            ),
            Dialect::Sqlite => format!(
                "json_each(n.content, {})",
                quote_sql(&field.container_json_path())
            ),
        }
    }

    /// Expression for the current item of [`Dialect::each`], as text.
    pub fn each_item(self) -> &'static str {
        match self {
            Dialect::Postgres => "w.value #>> '{}'",
            Dialect::Sqlite => "value",
        }
    }

    /// Condition true if the field is present in the node content.
    pub fn exists(self, field: &FieldPath) -> String {
        match (self, field.is_plain()) {
            (Dialect::Postgres, true) => {
                format!("jsonb_exists(n.content, {})", quote_sql(&field.name))
            }
            (Dialect::Postgres, false) => format!(
                "jsonb_path_exists(n.content, {})",
                quote_sql(&field.json_path())
            ),
            (Dialect::Sqlite, true) => format!(
                "json_type(n.content, {}) IS NOT NULL",
                quote_sql(&format!("$.{}", json_path_key(&field.name)))
            ),
            (Dialect::Sqlite, false) => match field.wildcard {
                Some(_) => format!("EXISTS (SELECT 1 FROM {})", self.each(field)),
                None => format!(
                    "json_type(n.content, {}) IS NOT NULL",
                    quote_sql(&field.container_json_path())
                ),
            },
        }
    }

    /// `LIKE` in all its variants. SQLite has no `ILIKE`.
    pub fn like(self, expr: &str, negated: bool, case_insensitive: bool, rhs: &str) -> String {
        let not = if negated { "NOT " } else { "" };

        match (self, case_insensitive) {
            (Dialect::Postgres, true) => format!("{} {}ILIKE {}", expr, not, rhs),
            (Dialect::Sqlite, true) => format!("{} {}LIKE {} COLLATE NOCASE", expr, not, rhs),
            (_, false) => format!("{} {}LIKE {}", expr, not, rhs),
        }
    }

    /// Regular expression match. SQLite relies on a registered `regexp`
    /// function (backing the `REGEXP` operator) and on `regexp_i`.
    pub fn regex(self, expr: &str, negated: bool, case_insensitive: bool, rhs: &str) -> String {
        match self {
            Dialect::Postgres => {
                let op = match (negated, case_insensitive) {
                    (false, false) => "~",
                    (false, true) => "~*",
                    (true, false) => "!~",
                    (true, true) => "!~*",
                };
                format!("{} {} {}", expr, op, rhs)
            }
            Dialect::Sqlite => {
                let matches = if case_insensitive {
                    format!("regexp_i({}, {})", expr, rhs)
                } else {
                    format!("{} REGEXP {}", expr, rhs)
                };

                if negated {
                    format!("NOT ({})", matches)
                } else {
                    matches
                }
            }
        }
    }

    /// The current timestamp.
    pub fn now(self) -> &'static str {
        "NOW()"
    }
}
