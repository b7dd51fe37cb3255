//! Where-clause compilation

use clickql_ir::{Condition, Connector, Operand, Predicate, Value};
use clickql_registry::{BindingGroup, BindingRegistry};

use crate::date_part;
use crate::wrap::wrap;
use crate::CompileError;

/// Comparison operators the dialect accepts.
const OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "<=>", "like", "not like", "ilike", "not ilike",
];

/// `where ...`, or an empty string when no predicate produced output.
pub(crate) fn compile_where(
    conditions: &[Condition],
    registry: &mut BindingRegistry,
) -> Result<String, CompileError> {
    let sql = compile_conditions(conditions, registry)?;
    if sql.is_empty() {
        Ok(sql)
    } else {
        Ok(format!("where {}", sql))
    }
}

/// Fragments joined by their connectors, in order. The first connector is
/// dropped.
pub(crate) fn compile_conditions(
    conditions: &[Condition],
    registry: &mut BindingRegistry,
) -> Result<String, CompileError> {
    let mut sql = String::new();
    for condition in conditions {
        let Some(fragment) = compile_predicate(&condition.predicate, registry)? else {
            continue;
        };
        if !sql.is_empty() {
            sql.push(' ');
            sql.push_str(connector(condition.connector));
            sql.push(' ');
        }
        sql.push_str(&fragment);
    }
    Ok(sql)
}

fn compile_predicate(
    predicate: &Predicate,
    registry: &mut BindingRegistry,
) -> Result<Option<String>, CompileError> {
    let sql = match predicate {
        Predicate::Raw { sql } => sql.clone(),
        Predicate::Basic {
            column,
            operator,
            value,
        } => format!(
            "{} {} {}",
            wrap(column),
            operator_sql(operator)?,
            parameter(registry, value)
        ),
        Predicate::Column {
            first,
            operator,
            second,
        } => format!("{} {} {}", wrap(first), operator_sql(operator)?, wrap(second)),
        Predicate::In {
            column,
            values,
            negated,
        } => {
            if values.is_empty() {
                empty_in(*negated).to_string()
            } else {
                let list = values
                    .iter()
                    .map(|value| parameter(registry, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} {} ({})", wrap(column), in_keyword(*negated), list)
            }
        }
        Predicate::InRaw {
            column,
            values,
            negated,
        } => {
            if values.is_empty() {
                empty_in(*negated).to_string()
            } else {
                let list = values
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} {} ({})", wrap(column), in_keyword(*negated), list)
            }
        }
        Predicate::Null { column, negated } => {
            if *negated {
                format!("isNotNull({})", wrap(column))
            } else {
                format!("isNull({})", wrap(column))
            }
        }
        Predicate::Between {
            column,
            low,
            high,
            negated,
        } => format!(
            "{} {} {} and {}",
            wrap(column),
            between_keyword(*negated),
            parameter(registry, low),
            parameter(registry, high)
        ),
        Predicate::BetweenColumns {
            column,
            low,
            high,
            negated,
        } => format!(
            "{} {} {} and {}",
            wrap(column),
            between_keyword(*negated),
            wrap(low),
            wrap(high)
        ),
        Predicate::DatePart {
            column,
            part,
            operator,
            value,
        } => {
            let operator = operator_sql(operator)?;
            let value = match value {
                Operand::Raw(sql) => sql.clone(),
                Operand::Bound(value) => {
                    let value = date_part::normalize(*part, value)?;
                    bound(registry, &value)
                }
            };
            format!("{} {} {}", date_part::function(*part, &wrap(column)), operator, value)
        }
        Predicate::Nested { conditions } => {
            let inner = compile_conditions(conditions, registry)?;
            if inner.is_empty() {
                return Ok(None);
            }
            format!("({})", inner)
        }
    };
    Ok(Some(sql))
}

/// Placeholder for an operand; raw SQL is rendered verbatim.
pub(crate) fn parameter(registry: &mut BindingRegistry, operand: &Operand) -> String {
    match operand {
        Operand::Raw(sql) => sql.clone(),
        Operand::Bound(value) => bound(registry, value),
    }
}

/// `{t}`, quoted as `'{t}'` for textual values.
pub(crate) fn bound(registry: &mut BindingRegistry, value: &Value) -> String {
    placeholder(&registry.bind(BindingGroup::Where, value), value)
}

pub(crate) fn placeholder(token: &clickql_registry::Token, value: &Value) -> String {
    if value.is_textual() {
        format!("'{}'", token.placeholder())
    } else {
        token.placeholder()
    }
}

pub(crate) fn operator_sql(operator: &str) -> Result<String, CompileError> {
    let normalized = operator.trim().to_ascii_lowercase();
    if OPERATORS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(CompileError::InvalidArgument(format!(
            "Illegal operator: {}",
            operator
        )))
    }
}

fn connector(connector: Connector) -> &'static str {
    match connector {
        Connector::And => "and",
        Connector::Or => "or",
    }
}

/// An empty set matches nothing for `in` and everything for `not in`.
fn empty_in(negated: bool) -> &'static str {
    if negated {
        "1 = 1"
    } else {
        "0 = 1"
    }
}

fn in_keyword(negated: bool) -> &'static str {
    if negated {
        "not in"
    } else {
        "in"
    }
}

fn between_keyword(negated: bool) -> &'static str {
    if negated {
        "not between"
    } else {
        "between"
    }
}
