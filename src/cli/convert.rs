//! JSON <-> compiler value conversion utilities

use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::CliError;
use crate::{Builtins, CompiledQuery, ParamValue};

/// Convert a bound parameter to serde_json::Value
///
/// Numbers that a JSON number cannot carry exactly are emitted as strings.
pub fn param_to_json(value: &ParamValue) -> serde_json::Value {
    match value {
        ParamValue::Boolean(b) => serde_json::Value::Bool(*b),
        ParamValue::String(s) => serde_json::Value::String(s.clone()),
        ParamValue::Number(n) => number_to_json(value)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(n.clone())),
    }
}

fn number_to_json(value: &ParamValue) -> Option<serde_json::Number> {
    let decimal = value.decimal()?;

    if value.is_integer() {
        return decimal.to_i64().map(serde_json::Number::from);
    }

    let float = decimal.to_f64()?;
    let exact = Decimal::from_str_exact(&float.to_string()).ok()? == decimal;

    if exact {
        serde_json::Number::from_f64(float)
    } else {
        None
    }
}

/// Convert a compiled fragment to `{"sql": ..., "params": {...}}`
pub fn compiled_to_json(query: &CompiledQuery) -> serde_json::Value {
    let params = query
        .params
        .iter()
        .map(|(name, value)| (name.clone(), param_to_json(value)))
        .collect();

    serde_json::json!({
        "sql": query.sql,
        "params": serde_json::Value::Object(params),
    })
}

/// Read builtins from a JSON object mapping names to SQL columns
pub fn builtins_from_json(json: &str) -> Result<Builtins, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let serde_json::Value::Object(map) = value else {
        return Err(CliError::InvalidBuiltin(
            "expected a JSON object of name -> column".to_string(),
        ));
    };

    map.into_iter()
        .map(|(name, column)| match column {
            serde_json::Value::String(column) => Ok((name, column)),
            other => Err(CliError::InvalidBuiltin(format!("{}={}", name, other))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_keep_their_kind() {
        assert_eq!(param_to_json(&ParamValue::from(3i64)), serde_json::json!(3));
        assert_eq!(
            param_to_json(&ParamValue::Number("2.5".to_string())),
            serde_json::json!(2.5)
        );
        assert_eq!(
            param_to_json(&ParamValue::Number("123456789012345678901234567890".to_string())),
            serde_json::json!("123456789012345678901234567890")
        );
        assert_eq!(
            param_to_json(&ParamValue::Number("0.12345678901234567890123456789".to_string())),
            serde_json::json!("0.12345678901234567890123456789")
        );
    }

    #[test]
    fn test_builtins_from_json() {
        let builtins = builtins_from_json(r#"{"published": "n.published"}"#).unwrap();
        assert_eq!(builtins.column("published"), Some("n.published"));

        assert!(builtins_from_json(r#"["published"]"#).is_err());
        assert!(builtins_from_json(r#"{"published": 1}"#).is_err());
    }
}
