//! # Patient Store
//!
//! Data access layer for the single managed relation, `patient`.
//!
//! The store decides *how* SQL runs. It performs no keyword filtering of its
//! own: callers must restrict which statements reach [`PatientStore::execute`].
//!
//! # Operations
//!
//! - `ensure_schema` - idempotent "create table if absent"
//! - `table_exists` - existence check run before bulk inserts
//! - `bulk_insert` - one parameterised multi-row insert
//! - `execute` - verbatim statement, no parameter binding

mod errors;
mod mysql;
mod render;

pub use errors::{DataError, DataResult};
pub use mysql::MySqlStore;
pub(crate) use render::returns_rows;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the managed relation
pub const PATIENT_TABLE: &str = "patient";

/// Idempotent schema statement for the managed relation
pub const CREATE_PATIENT_TABLE: &str = "CREATE TABLE IF NOT EXISTS patient (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    birth_date DATE NOT NULL
) ENGINE=InnoDB";

/// A single patient row as written by bulk insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRow {
    pub name: String,
    pub birth_date: NaiveDate,
}

impl PatientRow {
    pub fn new(name: impl Into<String>, birth_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            birth_date,
        }
    }
}

/// A result row: column name to JSON value, in column order
pub type ResultRow = Map<String, Value>;

/// Outcome of a verbatim statement
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// Mutating statement: number of affected rows
    Affected(u64),
    /// Result-producing statement: the rows, possibly empty
    Rows(Vec<ResultRow>),
}

/// Data access contract for the patient table.
///
/// Implementations own their connection. The HTTP dispatcher holds one
/// instance for the life of the process and shares it across requests.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Create the patient table if it does not already exist.
    async fn ensure_schema(&self) -> DataResult<()>;

    /// Check whether the patient table currently exists.
    async fn table_exists(&self) -> DataResult<bool>;

    /// Write all rows in one statement and return the number written.
    async fn bulk_insert(&self, rows: Vec<PatientRow>) -> DataResult<u64>;

    /// Run a caller-supplied statement verbatim.
    async fn execute(&self, statement: &str) -> DataResult<ExecOutcome>;
}
