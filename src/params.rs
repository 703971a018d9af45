//! Placeholder naming and bound parameter collection.
//!
//! Placeholders are `:` followed by a prefix and a running number
//! (`:p0`, `:p1`, ...). Fragments that are compiled independently and later
//! merged into one statement must use distinct prefixes.

use std::collections::BTreeMap;

use crate::{error::Error, value::ParamValue};

pub const DEFAULT_PREFIX: &str = "p";

/// Mints placeholder names for one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamCounter {
    prefix: String,
    next: usize,
}

impl ParamCounter {
    pub fn new(prefix: &str) -> Result<Self, Error> {
        let valid = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid {
            return Err(Error::InvalidPrefix(prefix.to_string()));
        }

        Ok(ParamCounter {
            prefix: prefix.to_string(),
            next: 0,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The next parameter name, without the leading colon.
    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

impl Default for ParamCounter {
    fn default() -> Self {
        ParamCounter {
            prefix: DEFAULT_PREFIX.to_string(),
            next: 0,
        }
    }
}

/// Parameter sink collecting the values bound while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    counter: ParamCounter,
    values: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Result<Self, Error> {
        Ok(Self::from(ParamCounter::new(prefix)?))
    }

    /// Bind `value` to a fresh name and return its placeholder, e.g. `:p0`.
    pub fn add(&mut self, value: impl Into<ParamValue>) -> String {
        let name = self.counter.next_name();
        let placeholder = format!(":{}", name);
        self.values.insert(name, value.into());
        placeholder
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn into_values(self) -> BTreeMap<String, ParamValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<ParamCounter> for QueryParams {
    fn from(counter: ParamCounter) -> Self {
        QueryParams {
            counter,
            values: BTreeMap::new(),
        }
    }
}
