//! Documentation content for the cmsfilter CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Values,
    Paths,
    Order,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "values" | "value" | "literals" => Some(Self::Values),
            "paths" | "path" | "urls" => Some(Self::Paths),
            "order" | "order_by" | "sort" => Some(Self::Order),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"CMSFILTER DOCUMENTATION

cmsfilter compiles filter expressions over node content into SQL WHERE
fragments for PostgreSQL (JSONB) and SQLite (JSON1), plus order-by clauses.

DOCUMENTATION CATEGORIES

  syntax            Conditions, connectors, parentheses and existence checks
  operators         Comparison, pattern, regular expression and list operators
  values            Strings, numbers, booleans, null, now and lists
  paths             Conditions on the node's URL paths
  order             Order-by statements

QUICK REFERENCE

  field = 'x'       Compare a content field
  field.de          Locale or sub key of a field value
  field.*           Any member of the field value
  field             Field exists
  a & b | c         AND / OR, no precedence applied by the compiler
  ( ... )           Grouping

Run 'cmsfilter doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_str(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Values) => Ok(VALUES_DOC),
        Some(DocCategory::Paths) => Ok(PATHS_DOC),
        Some(DocCategory::Order) => Ok(ORDER_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Conditions and Connectors

CONDITIONS
  operand operator operand
    The left side is a field, a builtin, a number or a boolean.

    Example:
      category = 'news'
      published = true

EXISTENCE CHECK
  field
    True if the node content contains the field.

    Constraints:
      - Only content fields, not builtins or path

CONNECTORS
  &     AND
  |     OR

    Example:
      category = 'news' & (rating > 5 | featured = true)

    Constraints:
      - '&&' and '||' are rejected
      - A connector may not end the expression
      - Connectors are emitted in source order; the database evaluates
        AND before OR. Use parentheses to group explicitly.

FIELDS
  title             $.title.value
  title.de          $.title.value.de
  title.*           any member of $.title.value
  tags.?            any element of the array $.tags.value

    Constraints:
      - Names start with a letter and contain letters, digits, '_' and '-'
      - A wildcard must be the last segment
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison, Patterns, Lists

COMPARISON
  =  !=  >  >=  <  <=

PATTERNS (SQL LIKE)
  ~~    like
  ~~*   case insensitive like
  !~~   not like
  !~~*  case insensitive not like

    Example:
      title ~~ '%rust%'

REGULAR EXPRESSIONS
  ~     matches
  ~*    matches, case insensitive
  !~    does not match
  !~*   does not match, case insensitive

    Example:
      title ~* /^rust/

LISTS
  @     in
  !@    not in

    Example:
      category @ ['news', 'blog']

    Constraints:
      - '==' is rejected, use '='
      - A bare '!' is rejected
"#;

const VALUES_DOC: &str = r#"VALUES - Literals

STRINGS
  "double", 'single' or /pattern/
    The delimiter can be escaped with a backslash: 'it\'s'

NUMBERS
  13, -4, 2.5

BOOLEANS
  true, false

NULL
  field = null      IS NULL
  field != null     IS NOT NULL

    Constraints:
      - Only = and != are allowed with null

NOW
  published <= now
    The current timestamp.

LISTS
  ['a', 'b', 3]
    Commas are optional. Lists contain strings, numbers and booleans.
"#;

const PATHS_DOC: &str = r#"PATHS - URL Path Conditions

  path = '/about'
  path.de ~~ '/produkte/%'
  path @ ['/a', '/b']

    Matches nodes with an active URL path satisfying the condition.
    'path.<locale>' additionally restricts the locale.
"#;

const ORDER_DOC: &str = r#"ORDER - Order-By Statements

  field [asc|desc], builtin [asc|desc], ...

    Example:
      cmsfilter order "title.de desc, published"

    Constraints:
      - Direction defaults to ASC
      - Wildcards are not allowed
"#;
