//! Grammar - compiles query descriptions to ClickHouse SQL
//!
//! Literal values never appear in the statement text. Each one is replaced by
//! a `{token}` placeholder assigned by a [`BindingRegistry`], and the values
//! travel next to the text in [`Parameters`].

use clickql_ir::{InsertPayload, IrError, Query, Record};
use clickql_registry::{BindingRegistry, Parameters};
use serde::Serialize;
use thiserror::Error;

mod date_part;
mod insert;
mod predicate;
mod select;
mod update;
mod wrap;

pub use insert::InsertStatement;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Statement text plus the values its placeholders refer to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    pub parameters: Parameters,
}

impl CompiledStatement {
    /// Tokens referenced by `{token}` placeholders in the text, in order of
    /// first appearance.
    pub fn referenced_tokens(&self) -> Vec<&str> {
        let mut tokens = Vec::new();
        let mut rest = self.sql.as_str();
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            let Some(len) = after.find('}') else { break };
            let candidate = &after[..len];
            if !candidate.is_empty()
                && candidate.bytes().all(|b| b.is_ascii_lowercase())
                && !tokens.contains(&candidate)
            {
                tokens.push(candidate);
            }
            rest = &after[len + 1..];
        }
        tokens
    }
}

/// ClickHouse statement compiler. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grammar;

impl Grammar {
    pub fn new() -> Self {
        Self
    }

    /// Compile a `select` with a fresh binding registry.
    pub fn compile_select(&self, query: &Query) -> Result<CompiledStatement, CompileError> {
        self.compile_select_with(query, &mut BindingRegistry::new())
    }

    /// Compile a `select` using bindings already registered by the caller.
    pub fn compile_select_with(
        &self,
        query: &Query,
        registry: &mut BindingRegistry,
    ) -> Result<CompiledStatement, CompileError> {
        let sql = select::compile_select(query, registry)?;
        Ok(finish("select", &query.table, sql, registry.parameters()))
    }

    /// Compile `select count() ...`; the column list is ignored.
    pub fn compile_count(&self, query: &Query) -> Result<CompiledStatement, CompileError> {
        self.compile_count_with(query, &mut BindingRegistry::new())
    }

    pub fn compile_count_with(
        &self,
        query: &Query,
        registry: &mut BindingRegistry,
    ) -> Result<CompiledStatement, CompileError> {
        let sql = select::compile_count(query, registry)?;
        Ok(finish("count", &query.table, sql, registry.parameters()))
    }

    /// Normalize insert rows. `Ok(None)` means there is nothing to insert.
    pub fn compile_insert(
        &self,
        table: &str,
        payload: InsertPayload,
    ) -> Result<Option<InsertStatement>, CompileError> {
        let statement = insert::compile_insert(table, payload)?;
        if let Some(statement) = &statement {
            tracing::debug!(
                table = %statement.table,
                columns = ?statement.columns,
                rows = statement.rows.len(),
                "compiled insert"
            );
        }
        Ok(statement)
    }

    /// Like [`Grammar::compile_insert`] for a JSON object or array of objects.
    pub fn compile_insert_json(
        &self,
        table: &str,
        payload: serde_json::Value,
    ) -> Result<Option<InsertStatement>, CompileError> {
        self.compile_insert(table, InsertPayload::from_json(payload)?)
    }

    /// Compile `alter table ... update ...`.
    pub fn compile_update(
        &self,
        query: &Query,
        assignments: &Record,
    ) -> Result<CompiledStatement, CompileError> {
        self.compile_update_with(query, assignments, &mut BindingRegistry::new())
    }

    pub fn compile_update_with(
        &self,
        query: &Query,
        assignments: &Record,
        registry: &mut BindingRegistry,
    ) -> Result<CompiledStatement, CompileError> {
        let (sql, parameters) = update::compile_update(query, assignments, registry)?;
        Ok(finish("update", &query.table, sql, parameters))
    }

    /// Compile `alter table ... delete ...`.
    pub fn compile_delete(&self, query: &Query) -> Result<CompiledStatement, CompileError> {
        self.compile_delete_with(query, &mut BindingRegistry::new())
    }

    pub fn compile_delete_with(
        &self,
        query: &Query,
        registry: &mut BindingRegistry,
    ) -> Result<CompiledStatement, CompileError> {
        let sql = update::compile_delete(query, registry)?;
        Ok(finish("delete", &query.table, sql, registry.parameters()))
    }

    /// Render a column the way statements do (aliases, JSON paths).
    pub fn wrap(&self, column: &clickql_ir::Column) -> String {
        wrap::wrap(column)
    }
}

fn finish(kind: &str, table: &str, sql: String, parameters: Parameters) -> CompiledStatement {
    tracing::debug!(kind, table, sql = %sql, params = parameters.len(), "compiled statement");
    CompiledStatement { sql, parameters }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_tokens() {
        let statement = CompiledStatement {
            sql: "select * from t where a = {a} and b = '{b}' and c in ({a}, {aa})".to_string(),
            parameters: Parameters::default(),
        };

        assert_eq!(statement.referenced_tokens(), vec!["a", "b", "aa"]);
    }

    #[test]
    fn test_referenced_tokens_ignores_unclosed_brace() {
        let statement = CompiledStatement {
            sql: "select '{' from t".to_string(),
            parameters: Parameters::default(),
        };

        assert!(statement.referenced_tokens().is_empty());
    }
}
