// tests/sqlite_backend.rs
//
// Runs compiled SQLite fragments against an in-memory database.

use cms_filter::{Builtins, CompiledQuery, Compiler, Dialect, ParamValue};
use regex::RegexBuilder;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, ToSql};

const SCHEMA: &str = r#"
CREATE TABLE nodes (
    node INTEGER PRIMARY KEY,
    published INTEGER NOT NULL,
    content TEXT NOT NULL
);

CREATE TABLE cms_urlpaths (
    node INTEGER NOT NULL,
    path TEXT NOT NULL,
    locale TEXT NOT NULL,
    inactive TEXT
);

INSERT INTO nodes VALUES (1, 1, '{
    "title": {"type": "text", "value": {"de": "Rust lernen", "en": "Learning Rust"}},
    "category": {"type": "text", "value": "news"},
    "rating": {"type": "number", "value": 4.5},
    "featured": {"type": "bool", "value": true},
    "tags": {"type": "list", "value": ["rust", "sql"]},
    "scores": {"type": "list", "value": [3, 7]},
    "flags": {"type": "list", "value": [true]},
    "date": {"type": "datetime", "value": "2026-01-15T10:00:00"}
}');

INSERT INTO nodes VALUES (2, 0, '{
    "title": {"type": "text", "value": {"de": "Kochen", "en": "Cooking"}},
    "category": {"type": "text", "value": "blog"},
    "rating": {"type": "number", "value": 2},
    "featured": {"type": "bool", "value": false},
    "tags": {"type": "list", "value": ["food"]},
    "date": {"type": "datetime", "value": "2026-09-01T00:00:00"}
}');

INSERT INTO nodes VALUES (3, 1, '{
    "title": {"type": "text", "value": {"de": "Über uns"}},
    "category": {"type": "text", "value": "page"},
    "meta-data": {"type": "text", "value": {"de": "x"}}
}');

INSERT INTO cms_urlpaths VALUES (1, '/rust', 'de', NULL);
INSERT INTO cms_urlpaths VALUES (1, '/learn-rust', 'en', NULL);
INSERT INTO cms_urlpaths VALUES (2, '/kochen', 'de', NULL);
INSERT INTO cms_urlpaths VALUES (2, '/old', 'de', '2025-01-01');
INSERT INTO cms_urlpaths VALUES (3, '/ueber-uns', 'de', NULL);
"#;

const NOW: &str = "2026-06-01T00:00:00";

fn text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

fn regexp_match(
    ctx: &Context<'_>,
    value: usize,
    pattern: usize,
    case_insensitive: bool,
) -> rusqlite::Result<Option<bool>> {
    let (Some(value), Some(pattern)) = (text(ctx.get_raw(value)), text(ctx.get_raw(pattern)))
    else {
        return Ok(None);
    };

    let regex = RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;

    Ok(Some(regex.is_match(&value)))
}

fn connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    // `X REGEXP Y` calls regexp(Y, X)
    conn.create_scalar_function("regexp", 2, flags, |ctx| regexp_match(ctx, 1, 0, false))
        .unwrap();
    conn.create_scalar_function("regexp_i", 2, flags, |ctx| regexp_match(ctx, 0, 1, true))
        .unwrap();
    conn.create_scalar_function("now", 0, FunctionFlags::SQLITE_UTF8, |_| Ok(NOW.to_string()))
        .unwrap();

    conn.execute_batch(SCHEMA).unwrap();
    conn
}

fn sql_value(value: &ParamValue) -> Value {
    match value {
        ParamValue::Boolean(b) => Value::Integer(i64::from(*b)),
        ParamValue::String(s) => Value::Text(s.clone()),
        ParamValue::Number(n) if value.is_integer() => Value::Integer(n.parse().unwrap()),
        ParamValue::Number(n) => Value::Real(n.parse().unwrap()),
    }
}

fn run(conn: &Connection, query: &CompiledQuery) -> Vec<i64> {
    let sql = format!(
        "SELECT n.node FROM nodes n WHERE {} ORDER BY n.node",
        query.sql
    );

    let names: Vec<String> = query.params.keys().map(|name| format!(":{}", name)).collect();
    let values: Vec<Value> = query.params.values().map(sql_value).collect();
    let params: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .map(String::as_str)
        .zip(values.iter().map(|v| v as &dyn ToSql))
        .collect();

    let mut stmt = conn
        .prepare(&sql)
        .unwrap_or_else(|e| panic!("Failed to prepare: {}\n{}", sql, e));

    stmt.query_map(params.as_slice(), |row| row.get(0))
        .unwrap_or_else(|e| panic!("Failed to run: {}\n{}", sql, e))
        .collect::<Result<Vec<i64>, _>>()
        .unwrap()
}

fn compiler() -> Compiler {
    Compiler::new(
        Dialect::Sqlite,
        Builtins::new().with("published", "n.published"),
    )
}

fn assert_nodes(cases: Vec<(&str, Vec<i64>)>) {
    let conn = connection();
    let compiler = compiler();

    for (input, expected) in cases {
        let query = compiler
            .compile(input)
            .unwrap_or_else(|e| panic!("Failed for input: {}\n{}", input, e));
        assert_eq!(
            run(&conn, &query),
            expected,
            "Failed for input: {}\nsql: {}",
            input,
            query.sql
        );
    }
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_comparisons() {
    assert_nodes(vec![
        ("category = 'news'", vec![1]),
        ("category != 'news'", vec![2, 3]),
        ("rating > 2.5", vec![1]),
        ("rating >= 2", vec![1, 2]),
        ("rating < 3", vec![2]),
        ("featured = true", vec![1]),
        ("featured = false", vec![2]),
        ("published = true", vec![1, 3]),
        ("title.de = 'Über uns'", vec![3]),
        ("meta-data.de = 'x'", vec![3]),
        ("1 = 1", vec![1, 2, 3]),
    ]);
}

#[test]
fn test_lists() {
    assert_nodes(vec![
        ("category @ ['news', 'page']", vec![1, 3]),
        ("category !@ ['news']", vec![2, 3]),
        ("rating @ [2, 4.5]", vec![1, 2]),
    ]);
}

#[test]
fn test_patterns() {
    assert_nodes(vec![
        ("title.de ~~ 'Rust%'", vec![1]),
        ("title.en ~~* 'learning%'", vec![1]),
        ("title.de !~~ 'K%'", vec![1, 3]),
        ("title.de ~ '^R'", vec![1]),
        ("title.de ~* '^k'", vec![2]),
        ("title.de !~ '^R'", vec![2, 3]),
        (r"title.en ~ /\bRust$/", vec![1]),
    ]);
}

#[test]
fn test_existence_and_null() {
    assert_nodes(vec![
        ("tags", vec![1, 2]),
        ("title.en", vec![1, 2]),
        ("rating = null", vec![3]),
        ("rating != null", vec![1, 2]),
        ("tags.?", vec![1, 2]),
    ]);
}

#[test]
fn test_wildcards() {
    assert_nodes(vec![
        ("tags.? = 'rust'", vec![1]),
        ("tags.? @ ['food', 'sql']", vec![1, 2]),
        ("title.* = 'Cooking'", vec![2]),
        ("title.* ~~ '%uns'", vec![3]),
        ("scores.? = 7", vec![1]),
        ("scores.? > 5", vec![1]),
        ("scores.? < 3", vec![]),
        ("scores.? @ [1, 3]", vec![1]),
        ("flags.? = true", vec![1]),
    ]);
}

#[test]
fn test_now() {
    assert_nodes(vec![("date <= now", vec![1]), ("date > now", vec![2])]);
}

#[test]
fn test_url_paths() {
    assert_nodes(vec![
        ("path = '/rust'", vec![1]),
        ("path.de = '/rust'", vec![1]),
        ("path.en = '/rust'", vec![]),
        ("path = '/old'", vec![]),
        ("path ~~ '/k%'", vec![2]),
        ("path.de @ ['/rust', '/ueber-uns']", vec![1, 3]),
        ("'/kochen' = path", vec![2]),
    ]);
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    assert_nodes(vec![
        ("category = 'news' | category = 'blog' & featured = true", vec![1]),
        ("(category = 'news' | category = 'blog') & featured = false", vec![2]),
        ("published = true & (tags.? = 'rust' | path = '/ueber-uns')", vec![1, 3]),
    ]);
}

#[test]
fn test_values_are_bound_not_inlined() {
    assert_nodes(vec![
        ("category = \"news' OR 1=1 --\"", vec![]),
        (r"category = 'news\' OR \'1\'=\'1'", vec![]),
    ]);
}

#[test]
fn test_merged_fragments() {
    let conn = connection();

    let filter = compiler().compile("published = true").unwrap();
    let types = compiler()
        .with_prefix("t")
        .unwrap()
        .compile("category @ ['news', 'blog']")
        .unwrap();

    assert_eq!(run(&conn, &filter.merge(types).unwrap()), vec![1]);
}
