use clickql_ir::{InsertPayload, Record, Value};
use serde::Serialize;

use crate::CompileError;

/// Normalized batch insert: one shared column order, positional rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

pub(crate) fn compile_insert(
    table: &str,
    payload: InsertPayload,
) -> Result<Option<InsertStatement>, CompileError> {
    let mut records = payload.into_batch().into_iter().map(Record::sorted);
    let Some(first) = records.next() else {
        return Ok(None);
    };

    let columns: Vec<String> = first.columns().map(str::to_string).collect();
    let mut rows = vec![first.into_values()];
    for (index, record) in records.enumerate() {
        if !record.columns().eq(columns.iter().map(String::as_str)) {
            let found: Vec<&str> = record.columns().collect();
            return Err(CompileError::InvalidArgument(format!(
                "insert record {} has columns {:?}, expected {:?}",
                index + 1,
                found,
                columns
            )));
        }
        rows.push(record.into_values());
    }

    Ok(Some(InsertStatement {
        table: table.to_string(),
        columns,
        rows,
    }))
}
