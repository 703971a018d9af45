// tests/order_tests.rs

use cms_filter::{Builtins, Compiler, Dialect};

fn compiler(dialect: Dialect) -> Compiler {
    let builtins = Builtins::new()
        .with("published", "n.published")
        .with("changed", "n.changed");
    Compiler::new(dialect, builtins)
}

fn order(dialect: Dialect, input: &str) -> String {
    compiler(dialect)
        .order(input)
        .unwrap_or_else(|e| panic!("Failed for input: {}\n{}", input, e))
}

#[test]
fn test_order_postgres() {
    assert_eq!(
        order(Dialect::Postgres, "title.de desc, published"),
        "n.content->'title'->'value'->>'de' DESC,\nn.published ASC"
    );
}

#[test]
fn test_order_sqlite() {
    assert_eq!(
        order(Dialect::Sqlite, "changed DESC, title asc, rating"),
        "n.changed DESC,\n\
         json_extract(n.content, '$.title.value') ASC,\n\
         json_extract(n.content, '$.rating.value') ASC"
    );
}

#[test]
fn test_order_whitespace_and_case() {
    let test_cases = vec![
        ("title", "json_extract(n.content, '$.title.value') ASC"),
        ("  title   ", "json_extract(n.content, '$.title.value') ASC"),
        ("title DeSc", "json_extract(n.content, '$.title.value') DESC"),
        ("\ttitle\tASC\n", "json_extract(n.content, '$.title.value') ASC"),
        ("meta-data.de", "json_extract(n.content, '$.\"meta-data\".value.de') ASC"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(order(Dialect::Sqlite, input), expected, "Failed for input: {:?}", input);
    }
}

#[test]
fn test_order_errors() {
    let test_cases = vec![
        ("", "Empty order by statement"),
        ("   ", "Empty order by statement"),
        ("title sideways", "Invalid order by segment: 'title sideways'"),
        ("title,", "Invalid order by segment: ''"),
        ("title desc asc", "Invalid order by segment: 'title desc asc'"),
        ("title.*", "Invalid order by segment: 'title.*'"),
        ("1title", "Invalid order by segment: '1title'"),
        ("title..de", "Invalid field name in order by statement: 'title..de'"),
        ("title.", "Invalid field name in order by statement: 'title.'"),
    ];

    for (input, expected) in test_cases {
        let err = compiler(Dialect::Postgres).order(input).unwrap_err();
        // Order by errors have no source pointer
        assert_eq!(err.to_string(), expected, "Failed for input: {:?}", input);
    }
}

#[test]
fn test_order_rejects_reserved_identifiers() {
    for input in ["path", "path.de", "now", "true", "false", "null", "fulltext", "fulltext.de"] {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            let err = compiler(dialect).order(input).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Invalid field name in order by statement: '{}'", input),
                "Failed for input: {:?}",
                input
            );
        }
    }
}

#[test]
fn test_order_prefixed_names_are_fields() {
    let test_cases = vec![
        ("pathname", "json_extract(n.content, '$.pathname.value') ASC"),
        ("nowhere desc", "json_extract(n.content, '$.nowhere.value') DESC"),
        ("published.de", "json_extract(n.content, '$.published.value.de') ASC"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(order(Dialect::Sqlite, input), expected, "Failed for input: {:?}", input);
    }
}
