//! MySQL-backed patient store
//!
//! Holds exactly one connection for the life of the process. Concurrent
//! requests serialise on the connection mutex at statement granularity; there
//! is no pool and no retry.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Either, Executor, MySql, QueryBuilder};
use tokio::sync::Mutex;

use super::errors::DataResult;
use super::render::{render_row, returns_rows};
use super::{ExecOutcome, PatientRow, PatientStore, CREATE_PATIENT_TABLE, PATIENT_TABLE};

const TABLE_EXISTS_QUERY: &str = "SHOW TABLES LIKE 'patient'";

/// Patient store over a single shared MySQL connection
pub struct MySqlStore {
    conn: Mutex<MySqlConnection>,
}

impl MySqlStore {
    /// Open the connection described by `options`.
    pub async fn connect(options: &MySqlConnectOptions) -> DataResult<Self> {
        let conn = MySqlConnection::connect_with(options).await?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already established connection.
    pub fn from_connection(conn: MySqlConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

async fn create_table(conn: &mut MySqlConnection) -> DataResult<()> {
    conn.execute(CREATE_PATIENT_TABLE).await?;
    tracing::info!(event = "SCHEMA_READY", table = PATIENT_TABLE, "patient table ready");
    Ok(())
}

async fn table_present(conn: &mut MySqlConnection) -> DataResult<bool> {
    Ok(conn.fetch_optional(TABLE_EXISTS_QUERY).await?.is_some())
}

#[async_trait]
impl PatientStore for MySqlStore {
    async fn ensure_schema(&self) -> DataResult<()> {
        let mut conn = self.conn.lock().await;
        create_table(&mut conn).await
    }

    async fn table_exists(&self) -> DataResult<bool> {
        let mut conn = self.conn.lock().await;
        table_present(&mut conn).await
    }

    async fn bulk_insert(&self, rows: Vec<PatientRow>) -> DataResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;

        // Check-then-create is not atomic; the CREATE is idempotent server-side
        if !table_present(&mut conn).await? {
            tracing::warn!(table = PATIENT_TABLE, "patient table missing, recreating");
            create_table(&mut conn).await?;
        }

        let mut builder = QueryBuilder::<MySql>::new("INSERT INTO patient (name, birth_date) ");
        builder.push_values(rows, |mut row_builder, row| {
            row_builder.push_bind(row.name).push_bind(row.birth_date);
        });

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    async fn execute(&self, statement: &str) -> DataResult<ExecOutcome> {
        let mut conn = self.conn.lock().await;

        let mut affected = 0u64;
        let mut rows = Vec::new();

        // A bare &str carries no arguments, so it goes over the text protocol verbatim
        let mut results = (&mut *conn).fetch_many(statement);
        while let Some(item) = results.try_next().await? {
            match item {
                Either::Left(done) => affected += done.rows_affected(),
                Either::Right(row) => rows.push(render_row(&row)?),
            }
        }

        if !rows.is_empty() || returns_rows(statement) {
            Ok(ExecOutcome::Rows(rows))
        } else {
            Ok(ExecOutcome::Affected(affected))
        }
    }
}
