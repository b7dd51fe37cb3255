//! Identifier rendering: aliases and JSON path selectors

use clickql_ir::Column;

pub(crate) fn wrap(column: &Column) -> String {
    match column {
        Column::Name(name) => wrap_name(name),
        Column::Raw(sql) => sql.clone(),
    }
}

/// `expr as alias` keeps the alias verbatim and wraps only the expression.
pub(crate) fn wrap_name(name: &str) -> String {
    match split_alias(name) {
        Some((expr, alias)) => format!("{} as {}", wrap_segment(expr), alias),
        None => wrap_segment(name.trim()),
    }
}

fn split_alias(name: &str) -> Option<(&str, &str)> {
    let at = name.to_ascii_lowercase().find(" as ")?;
    Some((name[..at].trim(), name[at + 4..].trim()))
}

fn wrap_segment(segment: &str) -> String {
    if segment.contains("->") {
        wrap_json_selector(segment)
    } else {
        segment.to_string()
    }
}

/// `field->a->b` becomes `simpleJSONExtractString(field, 'a.b')`.
fn wrap_json_selector(selector: &str) -> String {
    let (field, path) = selector.split_once("->").unwrap_or((selector, ""));
    format!(
        "simpleJSONExtractString({}, '{}')",
        field.trim(),
        wrap_json_path(path)
    )
}

/// Array suffixes such as `[0]` stay attached to their segment.
fn wrap_json_path(path: &str) -> String {
    path.split("->")
        .map(|segment| escape_literal(segment.trim()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape text for a single-quoted ClickHouse string literal.
pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
