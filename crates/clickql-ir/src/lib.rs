//! clickql Intermediate Representation (IR)
//!
//! Immutable query descriptions handed to the statement compiler.
//! All types are serializable so descriptions can be logged or stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod types;
pub use types::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl IrError {
    pub(crate) fn non_string_keys() -> Self {
        IrError::InvalidArgument(
            "Keys must be strings, i.e. {\"name\": \"John\", \"user_id\": 321}".to_string(),
        )
    }
}

/// Description of a query against one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub table: String,

    #[serde(default)]
    pub distinct: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orderings: Vec<Ordering>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Boolean connector to the previous condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub connector: Connector,
    pub predicate: Predicate,
}

/// Where-clause predicate kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    Raw {
        sql: String,
    },
    Basic {
        column: Column,
        operator: String,
        value: Operand,
    },
    Column {
        first: Column,
        operator: String,
        second: Column,
    },
    In {
        column: Column,
        values: Vec<Operand>,
        #[serde(default)]
        negated: bool,
    },
    /// Values are inlined; only integers are accepted
    InRaw {
        column: Column,
        values: Vec<i64>,
        #[serde(default)]
        negated: bool,
    },
    Null {
        column: Column,
        #[serde(default)]
        negated: bool,
    },
    Between {
        column: Column,
        low: Operand,
        high: Operand,
        #[serde(default)]
        negated: bool,
    },
    BetweenColumns {
        column: Column,
        low: Column,
        high: Column,
        #[serde(default)]
        negated: bool,
    },
    DatePart {
        column: Column,
        part: DatePart,
        operator: String,
        value: Operand,
    },
    Nested {
        conditions: Vec<Condition>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePart {
    Date,
    Time,
    Day,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<JoinOn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinOn {
    pub left: Column,
    pub operator: String,
    pub right: Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub column: Column,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            distinct: false,
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            groups: Vec::new(),
            orderings: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_select(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn select_raw(mut self, sql: impl Into<String>) -> Self {
        self.columns.push(Column::Raw(sql.into()));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append a predicate with an explicit connector.
    pub fn push(mut self, connector: Connector, predicate: Predicate) -> Self {
        self.conditions.push(Condition { connector, predicate });
        self
    }

    pub fn and_where(self, predicate: Predicate) -> Self {
        self.push(Connector::And, predicate)
    }

    pub fn or_where(self, predicate: Predicate) -> Self {
        self.push(Connector::Or, predicate)
    }

    /// Basic comparison. Comparing against `Value::Null` with `=` or
    /// `!=`/`<>` becomes a null check.
    pub fn filter(
        self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Operand>,
    ) -> Self {
        let predicate = basic_predicate(column.into(), operator, value.into());
        self.and_where(predicate)
    }

    pub fn or_filter(
        self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Operand>,
    ) -> Self {
        let predicate = basic_predicate(column.into(), operator, value.into());
        self.or_where(predicate)
    }

    pub fn where_raw(self, sql: impl Into<String>) -> Self {
        self.and_where(Predicate::Raw { sql: sql.into() })
    }

    pub fn or_where_raw(self, sql: impl Into<String>) -> Self {
        self.or_where(Predicate::Raw { sql: sql.into() })
    }

    pub fn where_column(
        self,
        first: impl Into<Column>,
        operator: &str,
        second: impl Into<Column>,
    ) -> Self {
        self.and_where(Predicate::Column {
            first: first.into(),
            operator: operator.to_string(),
            second: second.into(),
        })
    }

    pub fn where_in<I, V>(self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.and_where(in_predicate(column.into(), values, false))
    }

    pub fn or_where_in<I, V>(self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.or_where(in_predicate(column.into(), values, false))
    }

    pub fn where_not_in<I, V>(self, column: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.and_where(in_predicate(column.into(), values, true))
    }

    pub fn where_integer_in_raw(
        self,
        column: impl Into<Column>,
        values: impl IntoIterator<Item = i64>,
    ) -> Self {
        self.and_where(Predicate::InRaw {
            column: column.into(),
            values: values.into_iter().collect(),
            negated: false,
        })
    }

    pub fn where_integer_not_in_raw(
        self,
        column: impl Into<Column>,
        values: impl IntoIterator<Item = i64>,
    ) -> Self {
        self.and_where(Predicate::InRaw {
            column: column.into(),
            values: values.into_iter().collect(),
            negated: true,
        })
    }

    pub fn where_null(self, column: impl Into<Column>) -> Self {
        self.and_where(Predicate::Null {
            column: column.into(),
            negated: false,
        })
    }

    pub fn or_where_null(self, column: impl Into<Column>) -> Self {
        self.or_where(Predicate::Null {
            column: column.into(),
            negated: false,
        })
    }

    pub fn where_not_null(self, column: impl Into<Column>) -> Self {
        self.and_where(Predicate::Null {
            column: column.into(),
            negated: true,
        })
    }

    pub fn where_between(
        self,
        column: impl Into<Column>,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Self {
        self.and_where(Predicate::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
        })
    }

    pub fn where_not_between(
        self,
        column: impl Into<Column>,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Self {
        self.and_where(Predicate::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: true,
        })
    }

    pub fn where_between_columns(
        self,
        column: impl Into<Column>,
        low: impl Into<Column>,
        high: impl Into<Column>,
    ) -> Self {
        self.and_where(Predicate::BetweenColumns {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
        })
    }

    pub fn where_date_part(
        self,
        column: impl Into<Column>,
        part: DatePart,
        operator: &str,
        value: impl Into<Operand>,
    ) -> Self {
        self.and_where(Predicate::DatePart {
            column: column.into(),
            part,
            operator: operator.to_string(),
            value: value.into(),
        })
    }

    pub fn where_date(self, column: impl Into<Column>, value: impl Into<Operand>) -> Self {
        self.where_date_part(column, DatePart::Date, "=", value)
    }

    pub fn where_time(self, column: impl Into<Column>, value: impl Into<Operand>) -> Self {
        self.where_date_part(column, DatePart::Time, "=", value)
    }

    pub fn where_day(self, column: impl Into<Column>, value: impl Into<Operand>) -> Self {
        self.where_date_part(column, DatePart::Day, "=", value)
    }

    pub fn where_month(self, column: impl Into<Column>, value: impl Into<Operand>) -> Self {
        self.where_date_part(column, DatePart::Month, "=", value)
    }

    pub fn where_year(self, column: impl Into<Column>, value: impl Into<Operand>) -> Self {
        self.where_date_part(column, DatePart::Year, "=", value)
    }

    /// Parenthesized group built by `build` on an empty query of the same table.
    pub fn where_nested(self, build: impl FnOnce(Query) -> Query) -> Self {
        let inner = build(Query::table(self.table.clone()));
        self.and_where(Predicate::Nested {
            conditions: inner.conditions,
        })
    }

    pub fn or_where_nested(self, build: impl FnOnce(Query) -> Query) -> Self {
        let inner = build(Query::table(self.table.clone()));
        self.or_where(Predicate::Nested {
            conditions: inner.conditions,
        })
    }

    pub fn join(
        self,
        table: impl Into<String>,
        left: impl Into<Column>,
        operator: &str,
        right: impl Into<Column>,
    ) -> Self {
        self.join_kind(JoinKind::Inner, table, left, operator, right)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        left: impl Into<Column>,
        operator: &str,
        right: impl Into<Column>,
    ) -> Self {
        self.join_kind(JoinKind::Left, table, left, operator, right)
    }

    pub fn join_kind(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        left: impl Into<Column>,
        operator: &str,
        right: impl Into<Column>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: Some(JoinOn {
                left: left.into(),
                operator: operator.to_string(),
                right: right.into(),
            }),
        });
        self
    }

    pub fn cross_join(mut self, table: impl Into<String>) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            table: table.into(),
            on: None,
        });
        self
    }

    pub fn group_by(mut self, column: impl Into<Column>) -> Self {
        self.groups.push(column.into());
        self
    }

    pub fn order_by(mut self, column: impl Into<Column>, direction: Direction) -> Self {
        self.orderings.push(Ordering {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn order_by_desc(self, column: impl Into<Column>) -> Self {
        self.order_by(column, Direction::Desc)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

fn basic_predicate(column: Column, operator: &str, value: Operand) -> Predicate {
    if let Operand::Bound(Value::Null) = value {
        match operator {
            "=" => return Predicate::Null { column, negated: false },
            "!=" | "<>" => return Predicate::Null { column, negated: true },
            _ => {}
        }
    }

    Predicate::Basic {
        column,
        operator: operator.to_string(),
        value,
    }
}

fn in_predicate<I, V>(column: Column, values: I, negated: bool) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<Operand>,
{
    Predicate::In {
        column,
        values: values.into_iter().map(Into::into).collect(),
        negated,
    }
}
