//! Compile filter and order-by statements from CLI options

use super::{CliError, builtins_from_json, compiled_to_json};
use crate::{Builtins, Compiler, Dialect};

/// Options shared by the compile and order commands
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Dialect or driver name (`pgsql`, `sqlite`)
    pub dialect: String,
    /// Builtins given as `name=column`
    pub builtins: Vec<String>,
    /// JSON object of builtins, merged before `builtins`
    pub builtins_json: Option<String>,
    /// Placeholder prefix
    pub prefix: Option<String>,
}

impl CompilerOptions {
    pub fn compiler(&self) -> Result<Compiler, CliError> {
        let dialect: Dialect = self.dialect.parse()?;

        let mut builtins = match &self.builtins_json {
            Some(json) => builtins_from_json(json)?,
            None => Builtins::new(),
        };

        for spec in &self.builtins {
            let (name, column) = spec
                .split_once('=')
                .filter(|(name, column)| !name.trim().is_empty() && !column.trim().is_empty())
                .ok_or_else(|| CliError::InvalidBuiltin(spec.clone()))?;
            builtins.insert(name.trim(), column.trim());
        }

        let compiler = Compiler::new(dialect, builtins);

        match &self.prefix {
            Some(prefix) => Ok(compiler.with_prefix(prefix)?),
            None => Ok(compiler),
        }
    }
}

/// Compile a filter expression to `{"sql": ..., "params": {...}}`
pub fn execute_compile(
    options: &CompilerOptions,
    query: &str,
) -> Result<serde_json::Value, CliError> {
    let compiler = options.compiler()?;
    let compiled = compiler.compile(query)?;

    Ok(compiled_to_json(&compiled))
}

/// Compile an order-by statement to its SQL
pub fn execute_order(options: &CompilerOptions, statement: &str) -> Result<String, CliError> {
    let compiler = options.compiler()?;

    Ok(compiler.order(statement)?)
}
