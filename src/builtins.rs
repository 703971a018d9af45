use std::collections::BTreeMap;

/// Identifiers that resolve to SQL column expressions instead of JSON
/// content paths, e.g. `published -> n.published`.
///
/// Supplied by the caller once per query context and only read while
/// compiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Builtins {
    columns: BTreeMap<String, String>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as an alias for the SQL expression `column`.
    pub fn insert(&mut self, name: impl Into<String>, column: impl Into<String>) -> &mut Self {
        self.columns.insert(name.into(), column.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.insert(name, column);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Builtins {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Builtins {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[test]
fn test_builtin_lookup() {
    let builtins: Builtins = [("published", "n.published"), ("uid", "n.uid")]
        .into_iter()
        .collect();

    assert!(builtins.contains("published"));
    assert!(!builtins.contains("n.published"));
    assert_eq!(builtins.column("uid"), Some("n.uid"));
    assert_eq!(builtins.len(), 2);
}
