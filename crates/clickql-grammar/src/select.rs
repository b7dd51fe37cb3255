use clickql_ir::{Direction, Join, JoinKind, Query};
use clickql_registry::BindingRegistry;

use crate::predicate::{compile_where, operator_sql};
use crate::wrap::{wrap, wrap_name};
use crate::CompileError;

pub(crate) fn compile_select(
    query: &Query,
    registry: &mut BindingRegistry,
) -> Result<String, CompileError> {
    let mut parts = Vec::new();

    let columns = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.iter().map(wrap).collect::<Vec<_>>().join(", ")
    };
    if query.distinct {
        parts.push(format!("select distinct {}", columns));
    } else {
        parts.push(format!("select {}", columns));
    }

    parts.push(format!("from {}", wrap_name(&query.table)));
    parts.extend(compile_joins(&query.joins)?);
    push_nonempty(&mut parts, compile_where(&query.conditions, registry)?);

    if !query.groups.is_empty() {
        let groups = query.groups.iter().map(wrap).collect::<Vec<_>>();
        parts.push(format!("group by {}", groups.join(", ")));
    }

    if !query.orderings.is_empty() {
        let orderings = query
            .orderings
            .iter()
            .map(|o| format!("{} {}", wrap(&o.column), direction(o.direction)))
            .collect::<Vec<_>>();
        parts.push(format!("order by {}", orderings.join(", ")));
    }

    if let Some(limit) = query.limit {
        parts.push(format!("limit {}", limit));
    }
    if let Some(offset) = query.offset {
        parts.push(format!("offset {}", offset));
    }

    Ok(parts.join(" "))
}

/// `select count() ...` keeps the table, joins and filters only.
pub(crate) fn compile_count(
    query: &Query,
    registry: &mut BindingRegistry,
) -> Result<String, CompileError> {
    let mut parts = vec![format!("select count() from {}", wrap_name(&query.table))];
    parts.extend(compile_joins(&query.joins)?);
    push_nonempty(&mut parts, compile_where(&query.conditions, registry)?);
    Ok(parts.join(" "))
}

fn compile_joins(joins: &[Join]) -> Result<Vec<String>, CompileError> {
    joins.iter().map(compile_join).collect()
}

fn compile_join(join: &Join) -> Result<String, CompileError> {
    let keyword = match join.kind {
        JoinKind::Inner => "inner join",
        JoinKind::Left => "left join",
        JoinKind::Right => "right join",
        JoinKind::Full => "full join",
        JoinKind::Cross => "cross join",
    };
    let table = wrap_name(&join.table);

    match (&join.on, join.kind) {
        (_, JoinKind::Cross) | (None, _) => Ok(format!("{} {}", keyword, table)),
        (Some(on), _) => Ok(format!(
            "{} {} on {} {} {}",
            keyword,
            table,
            wrap(&on.left),
            operator_sql(&on.operator)?,
            wrap(&on.right)
        )),
    }
}

fn direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "asc",
        Direction::Desc => "desc",
    }
}

fn push_nonempty(parts: &mut Vec<String>, part: String) {
    if !part.is_empty() {
        parts.push(part);
    }
}
