//! ClickHouse mutations: `alter table ... update` and `alter table ... delete`

use clickql_ir::{Query, Record};
use clickql_registry::{BindingRegistry, Parameters};

use crate::predicate::{compile_where, placeholder};
use crate::wrap::wrap_name;
use crate::CompileError;

/// Mutations require a where clause; this one matches every row.
const MATCH_ALL: &str = "where 1 = 1";

pub(crate) fn compile_update(
    query: &Query,
    assignments: &Record,
    registry: &mut BindingRegistry,
) -> Result<(String, Parameters), CompileError> {
    if assignments.is_empty() {
        return Err(CompileError::InvalidArgument(
            "update requires at least one column".to_string(),
        ));
    }

    // Filters bind first so their tokens come before the assignments.
    let filter = mutation_where(query, registry)?;

    let mut tokens = Vec::with_capacity(assignments.len());
    let mut columns = Vec::with_capacity(assignments.len());
    for (column, value) in assignments.iter() {
        let token = registry.next_token(value);
        columns.push(format!("{} = {}", wrap_name(column), placeholder(&token, value)));
        tokens.push(token);
    }

    let sql = format!(
        "alter table {} update {} {}",
        wrap_name(&query.table),
        columns.join(", "),
        filter
    );
    Ok((sql, registry.parameters_for_update(&tokens)))
}

pub(crate) fn compile_delete(
    query: &Query,
    registry: &mut BindingRegistry,
) -> Result<String, CompileError> {
    let filter = mutation_where(query, registry)?;
    Ok(format!("alter table {} delete {}", wrap_name(&query.table), filter))
}

fn mutation_where(query: &Query, registry: &mut BindingRegistry) -> Result<String, CompileError> {
    let filter = compile_where(&query.conditions, registry)?;
    if filter.is_empty() {
        Ok(MATCH_ALL.to_string())
    } else {
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clickql_ir::Value;
    use clickql_registry::BindingGroup;

    #[test]
    fn test_update_text() {
        let query = Query::table("analytics").filter("name", "=", "page_view");
        let assignments = Record::new().with("name", "page_visit").with("status", 301);

        let (sql, params) = compile_update(&query, &assignments, &mut BindingRegistry::new()).unwrap();

        assert_eq!(
            sql,
            "alter table analytics update name = '{b}', status = {c} where name = '{a}'"
        );
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("a"), Some(&Value::from("page_view")));
        assert_eq!(params.get("b"), Some(&Value::from("page_visit")));
        assert_eq!(params.get("c"), Some(&Value::Int(301)));
    }

    #[test]
    fn test_update_reuses_filter_token() {
        let query = Query::table("analytics").filter("status", "=", 200);
        let assignments = Record::new().with("status", 200);

        let (sql, params) = compile_update(&query, &assignments, &mut BindingRegistry::new()).unwrap();

        assert_eq!(sql, "alter table analytics update status = {a} where status = {a}");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_update_without_filter_matches_all() {
        let assignments = Record::new().with("status", 0);

        let (sql, _) = compile_update(&Query::table("analytics"), &assignments, &mut BindingRegistry::new()).unwrap();

        assert_eq!(sql, "alter table analytics update status = {a} where 1 = 1");
    }

    #[test]
    fn test_update_drops_select_bindings() {
        let mut registry = BindingRegistry::new();
        registry.bind(BindingGroup::Select, &Value::from("unused"));
        let query = Query::table("analytics").filter("analytic_id", "=", 1);

        let (_, params) = compile_update(&query, &Record::new().with("status", 2), &mut registry).unwrap();

        let tokens: Vec<String> = params.tokens().map(|t| t.to_string()).collect();
        assert_eq!(tokens, vec!["b", "c"]);
    }

    #[test]
    fn test_update_requires_assignments() {
        let err = compile_update(&Query::table("analytics"), &Record::new(), &mut BindingRegistry::new())
            .unwrap_err();

        assert!(matches!(err, CompileError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete() {
        let query = Query::table("analytics").where_in("analytic_id", [1, 2]);
        let mut registry = BindingRegistry::new();

        let sql = compile_delete(&query, &mut registry).unwrap();

        assert_eq!(sql, "alter table analytics delete where analytic_id in ({a}, {b})");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_delete_without_filter_matches_all() {
        let sql = compile_delete(&Query::table("analytics"), &mut BindingRegistry::new()).unwrap();

        assert_eq!(sql, "alter table analytics delete where 1 = 1");
    }
}
