use std::fmt;

use rust_decimal::Decimal;

/// A scalar value bound to a named placeholder.
///
/// Numbers keep the literal text they were written with, so arbitrarily long
/// digit runs are bound without rounding.
///
/// # Examples
///
/// ```
/// use cms_filter::ParamValue;
/// use rust_decimal::Decimal;
///
/// let text = ParamValue::String("news".to_string());
/// let number = ParamValue::from(Decimal::new(125, 1));
///
/// assert_eq!(text.to_string(), "'news'");
/// assert_eq!(number.to_string(), "12.5");
/// assert_eq!(number.decimal(), Some(Decimal::new(125, 1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Boolean (`true`/`false`)
    Boolean(bool),

    /// Number literal, exactly as written in the query
    Number(String),

    /// UTF-8 string
    String(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for number literals without a fractional part.
    pub fn is_integer(&self) -> bool {
        matches!(self, ParamValue::Number(n) if !n.contains('.'))
    }

    /// The number as a decimal, if it fits one without rounding.
    pub fn decimal(&self) -> Option<Decimal> {
        match self {
            ParamValue::Number(n) => Decimal::from_str_exact(n).ok(),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

impl From<Decimal> for ParamValue {
    fn from(n: Decimal) -> Self {
        ParamValue::Number(n.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Number(n.to_string())
    }
}

/// Debug friendly rendering, strings in single quotes.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Boolean(b) => write!(f, "{}", b),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::String(s) => write!(f, "'{}'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_numbers_are_kept_verbatim() {
        let integer = ParamValue::Number("123456789012345678901234567890".to_string());
        assert!(integer.is_integer());
        assert_eq!(integer.decimal(), None);
        assert_eq!(integer.to_string(), "123456789012345678901234567890");

        let fraction = ParamValue::Number("0.12345678901234567890123456789".to_string());
        assert!(!fraction.is_integer());
        assert_eq!(fraction.decimal(), None);
    }
}
