// tests/properties.rs

use std::collections::BTreeSet;

use cms_filter::{Builtins, Compiler, Dialect, ParamValue};
use proptest::prelude::*;
use regex::Regex;

fn compiler(dialect: Dialect) -> Compiler {
    Compiler::new(dialect, Builtins::new().with("published", "n.published"))
}

/// Field names that can never collide with keywords or builtins.
fn field() -> impl Strategy<Value = String> {
    "x_[a-z]{1,5}(\\.[a-z]{2})?"
}

fn condition() -> impl Strategy<Value = String> {
    prop_oneof![
        field(),
        (field(), "[a-z0-9 %]{0,8}").prop_map(|(f, v)| format!("{} = '{}'", f, v)),
        (field(), "[a-z%]{1,8}").prop_map(|(f, v)| format!("{} ~~* '{}'", f, v)),
        (field(), -1000i64..1000).prop_map(|(f, n)| format!("{} > {}", f, n)),
        (field(), prop::collection::vec("[a-z]{1,4}", 1..4)).prop_map(|(f, items)| {
            let items: Vec<String> = items.iter().map(|i| format!("'{}'", i)).collect();
            format!("{} @ [{}]", f, items.join(", "))
        }),
        ("[a-z]{2}", "/[a-z]{1,5}").prop_map(|(l, p)| format!("path.{} = '{}'", l, p)),
        any::<bool>().prop_map(|b| format!("published = {}", b)),
        field().prop_map(|f| format!("{} != null", f)),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    condition().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{} & {}", a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{} | {}", a, b)),
            inner.prop_map(|e| format!("({})", e)),
        ]
    })
}

/// Strings that mix quotes, backslashes and control characters.
fn tricky_string() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('"'),
            Just('\''),
            Just('\\'),
            Just('\n'),
            Just('\r'),
            Just('\t'),
            any::<char>(),
        ],
        0..16,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Undo the JSONPath string escapes `\\`, `\"`, `\n`, `\r` and `\t`.
fn unescape_json_path(literal: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = literal.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next()? {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            _ => return None,
        }
    }

    Some(out)
}

/// Escape `s` for a single quoted filter string.
fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "\\'"))
}

proptest! {
    #[test]
    fn prop_compile_is_deterministic(query in expression()) {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let first = compiler(dialect).compile(&query);
            let second = compiler(dialect).compile(&query);

            prop_assert!(first.is_ok(), "query={} error={:?}", query, first);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_placeholders_match_params(query in expression()) {
        let placeholder = Regex::new(r":p\d+").unwrap();
        let compiled = compiler(Dialect::Sqlite).compile(&query).unwrap();

        let used: Vec<&str> = placeholder
            .find_iter(&compiled.sql)
            .map(|m| &m.as_str()[1..])
            .collect();
        let unique: BTreeSet<&str> = used.iter().copied().collect();
        let bound: BTreeSet<&str> = compiled.params.keys().map(String::as_str).collect();

        prop_assert_eq!(used.len(), unique.len(), "sql={}", compiled.sql);
        prop_assert_eq!(unique, bound);
    }

    #[test]
    fn prop_parentheses_stay_balanced(query in expression()) {
        let compiled = compiler(Dialect::Sqlite).compile(&query).unwrap();

        let mut depth: i64 = 0;
        for ch in compiled.sql.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            prop_assert!(depth >= 0, "sql={}", compiled.sql);
        }
        prop_assert_eq!(depth, 0, "sql={}", compiled.sql);
    }

    #[test]
    fn prop_unbalanced_input_is_rejected(query in expression()) {
        let compiler = compiler(Dialect::Postgres);

        let open_only = format!("({}", query);
        let close_only = format!("{})", query);
        prop_assert!(compiler.compile(&open_only).is_err());
        prop_assert!(compiler.compile(&close_only).is_err());
    }

    #[test]
    fn prop_sqlite_strings_are_bound_verbatim(value in "[^\\\\]{0,16}") {
        let compiled = compiler(Dialect::Sqlite)
            .compile(&format!("title = {}", quoted(&value)))
            .unwrap();

        prop_assert_eq!(compiled.sql, "json_extract(n.content, '$.title.value') = :p0");
        prop_assert_eq!(compiled.params.get("p0"), Some(&ParamValue::String(value)));
    }

    #[test]
    fn prop_postgres_json_path_literal_is_closed(value in "(?s).{0,16}") {
        prop_assume!(!value.ends_with('\\'));

        let compiled = compiler(Dialect::Postgres)
            .compile(&format!("title = {}", quoted(&value)))
            .unwrap();

        let prefix = "jsonb_path_match(n.content, '";
        prop_assert!(compiled.sql.starts_with(prefix), "sql={}", compiled.sql);
        prop_assert!(compiled.sql.ends_with("')"), "sql={}", compiled.sql);

        // Inside the SQL literal every quote is doubled
        let literal = &compiled.sql[prefix.len()..compiled.sql.len() - 2];
        prop_assert!(!literal.replace("''", "").contains('\''), "sql={}", compiled.sql);
        prop_assert!(compiled.params.is_empty());
    }

    #[test]
    fn prop_postgres_json_path_literal_round_trips(value in tricky_string()) {
        prop_assume!(!value.ends_with('\\'));

        let compiled = compiler(Dialect::Postgres)
            .compile(&format!("title = {}", quoted(&value)))
            .unwrap();

        let prefix = "jsonb_path_match(n.content, '$.title.value == \"";
        let suffix = "\"')";
        prop_assert!(compiled.sql.starts_with(prefix), "sql={}", compiled.sql);
        prop_assert!(compiled.sql.ends_with(suffix), "sql={}", compiled.sql);

        let literal = compiled.sql[prefix.len()..compiled.sql.len() - suffix.len()]
            .replace("''", "'");
        prop_assert_eq!(unescape_json_path(&literal), Some(value), "sql={}", compiled.sql);
    }
}
