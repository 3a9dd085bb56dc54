//! Result-set rendering
//!
//! Converts MySQL rows into JSON objects keyed by column name. Statements run
//! over the text protocol, so every decoder below accepts textual values.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::errors::DataResult;
use super::ResultRow;
use crate::gateway::starts_with_keyword;

/// Leading keywords of statements that produce a result set
const ROW_KEYWORDS: &[&str] = &[
    "SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH", "TABLE", "VALUES",
];

/// Returns true if the statement's leading keyword produces a result set.
///
/// Uses the same prefix test as the statement allow-list, so anything admitted
/// as a SELECT renders as rows. Used only to tell "no rows" apart from "no
/// affected rows"; this is not a policy check.
pub(crate) fn returns_rows(statement: &str) -> bool {
    ROW_KEYWORDS
        .iter()
        .any(|keyword| starts_with_keyword(statement, keyword))
}

/// JSON shape a column renders to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    Signed,
    Unsigned,
    Float,
    Date,
    DateTime,
    Binary,
    Text,
}

impl ColumnKind {
    fn from_type_name(name: &str) -> Self {
        match name {
            "NULL" => ColumnKind::Null,
            "BOOLEAN" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ColumnKind::Signed,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => ColumnKind::Unsigned,
            "FLOAT" | "DOUBLE" => ColumnKind::Float,
            "DATE" => ColumnKind::Date,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
            | "GEOMETRY" => ColumnKind::Binary,
            _ => ColumnKind::Text,
        }
    }
}

/// Render one row as a JSON object in column order.
pub(crate) fn render_row(row: &MySqlRow) -> DataResult<ResultRow> {
    let mut object = ResultRow::new();

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let kind = ColumnKind::from_type_name(column.type_info().name());
            render_value(row, index, kind)?
        };
        object.insert(column.name().to_string(), value);
    }

    Ok(object)
}

fn render_value(row: &MySqlRow, index: usize, kind: ColumnKind) -> DataResult<Value> {
    let value = match kind {
        ColumnKind::Null => Value::Null,
        ColumnKind::Bool => Value::Bool(row.try_get_unchecked::<bool, _>(index)?),
        ColumnKind::Signed => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        ColumnKind::Unsigned => Value::from(row.try_get_unchecked::<u64, _>(index)?),
        ColumnKind::Float => {
            let float = row.try_get_unchecked::<f64, _>(index)?;
            Number::from_f64(float).map_or(Value::Null, Value::Number)
        }
        // Zero dates ("0000-00-00") do not decode; fall back to the raw text
        ColumnKind::Date => match row.try_get_unchecked::<NaiveDate, _>(index) {
            Ok(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            Err(_) => text(row, index)?,
        },
        ColumnKind::DateTime => match row.try_get_unchecked::<NaiveDateTime, _>(index) {
            Ok(stamp) => Value::String(stamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            Err(_) => text(row, index)?,
        },
        ColumnKind::Binary => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::String(BASE64.encode(bytes))
        }
        ColumnKind::Text => text(row, index)?,
    };

    Ok(value)
}

fn text(row: &MySqlRow, index: usize) -> DataResult<Value> {
    Ok(Value::String(row.try_get_unchecked::<String, _>(index)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_rows_for_queries() {
        assert!(returns_rows("SELECT * FROM patient"));
        assert!(returns_rows("  select 1"));
        assert!(returns_rows("show tables"));
        assert!(returns_rows("WITH t AS (SELECT 1) SELECT * FROM t"));
        assert!(returns_rows("VALUES(1)"));
    }

    #[test]
    fn test_returns_rows_without_space_after_keyword() {
        assert!(returns_rows("SELECT*FROM patient"));
        assert!(returns_rows("SELECT`name`FROM patient"));
        assert!(returns_rows("SELECT'a'"));
        assert!(returns_rows("select(1)"));
    }

    #[test]
    fn test_returns_rows_agrees_with_allow_list() {
        use crate::gateway::StatementPolicy;

        for statement in ["SELECT*FROM patient", "SELECT 1", "select'x'", "SELECTED"] {
            assert!(StatementPolicy::SelectOrInsert.permits(statement));
            assert!(returns_rows(statement), "{}", statement);
        }
    }

    #[test]
    fn test_returns_rows_for_mutations() {
        assert!(!returns_rows("INSERT INTO patient (name, birth_date) VALUES ('a', '2000-01-01')"));
        assert!(!returns_rows("UPDATE patient SET name = 'b'"));
        assert!(!returns_rows(""));
        assert!(!returns_rows("DELETE FROM patient"));
        assert!(!returns_rows("INSERT INTO patient SELECT * FROM patient"));
    }

    #[test]
    fn test_column_kinds() {
        assert_eq!(ColumnKind::from_type_name("INT"), ColumnKind::Signed);
        assert_eq!(ColumnKind::from_type_name("BIGINT UNSIGNED"), ColumnKind::Unsigned);
        assert_eq!(ColumnKind::from_type_name("BOOLEAN"), ColumnKind::Bool);
        assert_eq!(ColumnKind::from_type_name("DATE"), ColumnKind::Date);
        assert_eq!(ColumnKind::from_type_name("TIMESTAMP"), ColumnKind::DateTime);
        assert_eq!(ColumnKind::from_type_name("VARBINARY"), ColumnKind::Binary);
        assert_eq!(ColumnKind::from_type_name("VARCHAR"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_type_name("DECIMAL"), ColumnKind::Text);
    }
}
