//! End-to-end statement compilation: text and parameters together
//!
//! Run with: cargo test --package clickql-grammar --test statements

use clickql_grammar::{CompileError, CompiledStatement, Grammar};
use clickql_ir::{Connector, InsertPayload, Predicate, Query, Record, Value};
use clickql_registry::{BindingRegistry, Token};
use serde_json::json;

/// Every token in the text has a parameter and every parameter is used.
fn assert_tokens_consistent(statement: &CompiledStatement) {
    let referenced = statement.referenced_tokens();
    let bound: Vec<&str> = statement.parameters.tokens().map(Token::as_str).collect();

    let mut referenced_sorted = referenced.clone();
    referenced_sorted.sort();
    let mut bound_sorted = bound.clone();
    bound_sorted.sort();
    assert_eq!(referenced_sorted, bound_sorted, "sql: {}", statement.sql);
}

#[test]
fn test_select_with_two_filters() {
    let query = Query::table("analytics")
        .push(Connector::And, Predicate::Basic {
            column: "status".into(),
            operator: "=".to_string(),
            value: 200.into(),
        })
        .push(Connector::And, Predicate::Basic {
            column: "id".into(),
            operator: ">".to_string(),
            value: 5.into(),
        });

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(statement.sql, "select * from analytics where status = {a} and id > {b}");
    assert_eq!(statement.parameters.to_json(), json!({"a": 200, "b": 5}));
    assert_tokens_consistent(&statement);
}

#[test]
fn test_repeated_value_shares_token() {
    let query = Query::table("analytics")
        .filter("status", "=", 200)
        .or_filter("previous_status", "=", 200)
        .where_in("code", [200, 404]);

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(
        statement.sql,
        "select * from analytics where status = {a} or previous_status = {a} and code in ({a}, {b})"
    );
    assert_eq!(statement.parameters.len(), 2);
    assert_tokens_consistent(&statement);
}

#[test]
fn test_same_text_different_type_gets_new_token() {
    let query = Query::table("analytics")
        .filter("analytic_id", "=", 1)
        .filter("name", "=", "1");

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(statement.sql, "select * from analytics where analytic_id = {a} and name = '{b}'");
    assert_eq!(statement.parameters.get("a"), Some(&Value::Int(1)));
    assert_eq!(statement.parameters.get("b"), Some(&Value::from("1")));
}

#[test]
fn test_infinities_and_typed_arrays_get_own_tokens() {
    let query = Query::table("metrics")
        .filter("x", "<", f64::INFINITY)
        .filter("x", ">", f64::NEG_INFINITY)
        .filter("tags", "=", Value::Array(vec![Value::Int(1)]))
        .filter("tags", "=", Value::Array(vec![Value::UInt(1)]));

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(
        statement.sql,
        "select * from metrics where x < {a} and x > {b} and tags = {c} and tags = {d}"
    );
    assert_eq!(statement.parameters.get("a"), Some(&Value::Float(f64::INFINITY)));
    assert_eq!(statement.parameters.get("b"), Some(&Value::Float(f64::NEG_INFINITY)));
    assert_eq!(statement.parameters.get("d"), Some(&Value::Array(vec![Value::UInt(1)])));
    assert_tokens_consistent(&statement);
}

#[test]
fn test_empty_in_lists_are_tautologies() {
    let none: Vec<i64> = Vec::new();
    let grammar = Grammar::new();

    let in_statement = grammar
        .compile_select(&Query::table("analytics").where_in("status", none.clone()))
        .unwrap();
    let not_in_statement = grammar
        .compile_select(&Query::table("analytics").where_not_in("status", none))
        .unwrap();

    assert_eq!(in_statement.sql, "select * from analytics where 0 = 1");
    assert_eq!(not_in_statement.sql, "select * from analytics where 1 = 1");
    assert!(in_statement.parameters.is_empty());
}

#[test]
fn test_null_filters() {
    let query = Query::table("analytics")
        .filter("label", "=", Value::Null)
        .filter("name", "!=", Value::Null);

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(
        statement.sql,
        "select * from analytics where isNull(label) and isNotNull(name)"
    );
    assert!(statement.parameters.is_empty());
}

#[test]
fn test_full_select() {
    let query = Query::table("analytics")
        .select(["analytics.status", "models.name as model", "metadata->referer[0]->host as host"])
        .distinct()
        .join("models", "models.id", "=", "analytics.analytic_id")
        .where_between("ts", "2024-01-01 00:00:00", "2024-02-01 00:00:00")
        .where_month("ts", "01")
        .or_where_nested(|q| q.where_null("label").filter("name", "like", "page_%"))
        .group_by("analytics.status")
        .order_by_desc("analytics.status")
        .limit(100)
        .offset(0);

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(
        statement.sql,
        "select distinct analytics.status, models.name as model, \
         simpleJSONExtractString(metadata, 'referer[0].host') as host from analytics \
         inner join models on models.id = analytics.analytic_id \
         where ts between '{a}' and '{b}' and toMonth(ts) = {c} \
         or (isNull(label) and name like '{d}') \
         group by analytics.status order by analytics.status desc limit 100 offset 0"
    );
    assert_eq!(statement.parameters.get("c"), Some(&Value::Int(1)));
    assert_tokens_consistent(&statement);
}

#[test]
fn test_count() {
    let query = Query::table("analytics")
        .select(["status"])
        .filter("status", "=", 200)
        .limit(1);

    let statement = Grammar::new().compile_count(&query).unwrap();

    assert_eq!(statement.sql, "select count() from analytics where status = {a}");
    assert_tokens_consistent(&statement);
}

#[test]
fn test_single_record_and_batch_of_one_are_equivalent() {
    let grammar = Grammar::new();
    let record = Record::new().with("name", "page_view").with("analytic_id", 321);

    let single = grammar.compile_insert("analytics", record.clone().into()).unwrap();
    let batch = grammar.compile_insert("analytics", vec![record].into()).unwrap();

    assert_eq!(single, batch);
    let statement = single.unwrap();
    assert_eq!(statement.table, "analytics");
    assert_eq!(statement.columns, vec!["analytic_id", "name"]);

    let empty_single = grammar.compile_insert("analytics", Record::new().into());
    let empty_batch = grammar.compile_insert("analytics", vec![Record::new()].into());

    assert_eq!(empty_single, Ok(None));
    assert_eq!(empty_batch, empty_single);
}

#[test]
fn test_insert_json_batch_in_different_key_orders() {
    let payload = json!([
        {"name": "page_view", "analytic_id": 1, "status": 200},
        {"status": 404, "analytic_id": 2, "name": "page_visit"},
    ]);

    let statement = Grammar::new()
        .compile_insert_json("analytics", payload)
        .unwrap()
        .unwrap();

    assert_eq!(statement.columns, vec!["analytic_id", "name", "status"]);
    assert_eq!(
        statement.rows[1],
        vec![Value::Int(2), Value::from("page_visit"), Value::Int(404)]
    );
}

#[test]
fn test_empty_insert_has_no_statement() {
    let grammar = Grammar::new();

    assert_eq!(grammar.compile_insert("analytics", InsertPayload::Batch(vec![])).unwrap(), None);
    assert_eq!(grammar.compile_insert_json("analytics", json!({})).unwrap(), None);
}

#[test]
fn test_insert_positional_array_rejected() {
    let err = Grammar::new()
        .compile_insert_json("analytics", json!([1, "page_view"]))
        .unwrap_err();

    assert!(matches!(err, CompileError::Ir(_)));
    assert!(err.to_string().contains("Keys must be strings"));
}

#[test]
fn test_update_merges_filter_and_assignment_bindings() {
    let query = Query::table("analytics")
        .filter("name", "=", "page_view")
        .where_in("status", [200, 301]);
    let assignments = Record::new().with("status", 301).with("name", "page_visit");

    let statement = Grammar::new().compile_update(&query, &assignments).unwrap();

    assert_eq!(
        statement.sql,
        "alter table analytics update status = {c}, name = '{d}' \
         where name = '{a}' and status in ({b}, {c})"
    );
    assert_eq!(
        statement.parameters.to_json(),
        json!({"a": "page_view", "b": 200, "c": 301, "d": "page_visit"})
    );
    assert_tokens_consistent(&statement);
}

#[test]
fn test_delete() {
    let statement = Grammar::new()
        .compile_delete(&Query::table("analytics").filter("analytic_id", "<", 10))
        .unwrap();

    assert_eq!(statement.sql, "alter table analytics delete where analytic_id < {a}");
    assert_tokens_consistent(&statement);
}

#[test]
fn test_raw_sql_with_caller_bindings() {
    let mut registry = BindingRegistry::new();
    let token = registry.add_binding("page_view", "where").unwrap();
    let query = Query::table("analytics")
        .where_raw(format!("name = '{}'", token.placeholder()))
        .filter("status", "=", 200);

    let statement = Grammar::new().compile_select_with(&query, &mut registry).unwrap();

    assert_eq!(
        statement.sql,
        "select * from analytics where name = '{a}' and status = {b}"
    );
    assert_tokens_consistent(&statement);
}

#[test]
fn test_illegal_operator_fails_without_sql() {
    let result = Grammar::new().compile_select(&Query::table("analytics").filter("status", "==", 1));

    assert!(matches!(result, Err(CompileError::InvalidArgument(_))));
}

#[test]
fn test_query_description_from_json() {
    let query: Query = serde_json::from_str(
        r#"{
            "table": "analytics",
            "conditions": [
                {"connector": "and", "predicate": {"kind": "basic", "column": {"type": "Name", "sql": "status"}, "operator": "=", "value": {"type": "Bound", "value": 200}}},
                {"connector": "or", "predicate": {"kind": "null", "column": {"type": "Name", "sql": "label"}}}
            ]
        }"#,
    )
    .unwrap();

    let statement = Grammar::new().compile_select(&query).unwrap();

    assert_eq!(statement.sql, "select * from analytics where status = {a} or isNull(label)");
}
