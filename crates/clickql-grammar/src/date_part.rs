//! Date-part predicates: extraction functions and value normalization

use chrono::{Datelike, Timelike};
use clickql_ir::{DatePart, Value};

use crate::CompileError;

/// Dialect function applied to the column side of the comparison.
pub(crate) fn function(part: DatePart, column: &str) -> String {
    match part {
        DatePart::Date => format!("toDate({})", column),
        DatePart::Time => format!("formatDateTime({}, '%H:%i:%s')", column),
        DatePart::Day => format!("toDayOfMonth({})", column),
        DatePart::Month => format!("toMonth({})", column),
        DatePart::Year => format!("toYear({})", column),
    }
}

/// Reduce the compared value to what the extraction function returns:
/// `YYYY-MM-DD` text for dates, `HH:MM:SS` text for times and plain
/// integers (no leading zeros) for day, month and year.
pub(crate) fn normalize(part: DatePart, value: &Value) -> Result<Value, CompileError> {
    match part {
        DatePart::Date => match value {
            Value::Date(d) => Ok(Value::String(d.format("%Y-%m-%d").to_string())),
            Value::DateTime(dt) => Ok(Value::String(dt.format("%Y-%m-%d").to_string())),
            Value::String(_) => Ok(value.clone()),
            other => Err(mismatch(part, other)),
        },
        DatePart::Time => match value {
            Value::DateTime(dt) => Ok(Value::String(format!(
                "{:02}:{:02}:{:02}",
                dt.hour(),
                dt.minute(),
                dt.second()
            ))),
            Value::String(_) => Ok(value.clone()),
            other => Err(mismatch(part, other)),
        },
        DatePart::Day => component(part, value, |d| i64::from(d.day())),
        DatePart::Month => component(part, value, |d| i64::from(d.month())),
        DatePart::Year => component(part, value, |d| i64::from(d.year())),
    }
}

fn component(
    part: DatePart,
    value: &Value,
    extract: impl Fn(&chrono::NaiveDate) -> i64,
) -> Result<Value, CompileError> {
    let number = match value {
        Value::Date(d) => extract(d),
        Value::DateTime(dt) => extract(&dt.date()),
        Value::Int(i) => *i,
        Value::UInt(u) => i64::try_from(*u).map_err(|_| mismatch(part, value))?,
        Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => *f as i64,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| mismatch(part, value))?,
        other => return Err(mismatch(part, other)),
    };
    Ok(Value::Int(number))
}

fn mismatch(part: DatePart, value: &Value) -> CompileError {
    CompileError::InvalidArgument(format!(
        "cannot compare {:?} part against {} value {:?}",
        part,
        value.type_name(),
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime() -> Value {
        Value::from(
            NaiveDate::from_ymd_opt(2024, 3, 7)
                .unwrap()
                .and_hms_opt(9, 5, 1)
                .unwrap(),
        )
    }

    #[test]
    fn test_functions() {
        assert_eq!(function(DatePart::Date, "ts"), "toDate(ts)");
        assert_eq!(function(DatePart::Time, "ts"), "formatDateTime(ts, '%H:%i:%s')");
        assert_eq!(function(DatePart::Day, "ts"), "toDayOfMonth(ts)");
        assert_eq!(function(DatePart::Month, "ts"), "toMonth(ts)");
        assert_eq!(function(DatePart::Year, "ts"), "toYear(ts)");
    }

    #[test]
    fn test_datetime_components() {
        let value = datetime();

        assert_eq!(normalize(DatePart::Date, &value).unwrap(), Value::from("2024-03-07"));
        assert_eq!(normalize(DatePart::Time, &value).unwrap(), Value::from("09:05:01"));
        assert_eq!(normalize(DatePart::Day, &value).unwrap(), Value::Int(7));
        assert_eq!(normalize(DatePart::Month, &value).unwrap(), Value::Int(3));
        assert_eq!(normalize(DatePart::Year, &value).unwrap(), Value::Int(2024));
    }

    #[test]
    fn test_leading_zero_strings_become_numbers() {
        assert_eq!(normalize(DatePart::Day, &Value::from("05")).unwrap(), Value::Int(5));
        assert_eq!(normalize(DatePart::Month, &Value::from("09")).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_strings_pass_through_for_date_and_time() {
        assert_eq!(
            normalize(DatePart::Date, &Value::from("2024-03-07")).unwrap(),
            Value::from("2024-03-07")
        );
        assert_eq!(
            normalize(DatePart::Time, &Value::from("10:11:12")).unwrap(),
            Value::from("10:11:12")
        );
    }

    #[test]
    fn test_rejects_unusable_values() {
        assert!(normalize(DatePart::Month, &Value::from("march")).is_err());
        assert!(normalize(DatePart::Time, &Value::Int(3)).is_err());
        assert!(normalize(DatePart::Day, &Value::Null).is_err());
    }

    #[test]
    fn test_floats_must_be_whole() {
        assert_eq!(normalize(DatePart::Day, &Value::Float(7.0)).unwrap(), Value::Int(7));
        assert!(normalize(DatePart::Day, &Value::Float(7.9)).is_err());
        assert!(normalize(DatePart::Month, &Value::Float(f64::NAN)).is_err());
        assert!(normalize(DatePart::Year, &Value::Float(f64::INFINITY)).is_err());
    }
}
