//! SQLite persistence for cleaned tables.
//!
//! [`SqliteStore`] wraps a single-connection pool on a file-backed database.
//! Writing a table replaces any existing table of the same name; reading maps
//! the declared SQLite column types back onto numeric or categorical columns.

use crate::error::{PipelineError, Result};
use crate::table::{Column, ColumnData, Table};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;

/// Name of the table written by the ETL stage.
pub const EMISSIONS_TABLE: &str = "emissions";

/// A file-backed SQLite database holding pipeline tables.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (used by tests).
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Write `table` under `name`, replacing any existing table.
    pub async fn write_table(&self, name: &str, table: &Table) -> Result<()> {
        if table.n_columns() == 0 {
            return Err(PipelineError::EmptyData(format!(
                "cannot store table '{}' without columns",
                name
            )));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))
            .execute(&mut *tx)
            .await?;

        let column_defs: Vec<String> = table
            .columns()
            .iter()
            .map(|c| {
                let sql_type = if c.is_numeric() { "REAL" } else { "TEXT" };
                format!("{} {}", quote_ident(c.name()), sql_type)
            })
            .collect();
        sqlx::query(&format!(
            "CREATE TABLE {} ({})",
            quote_ident(name),
            column_defs.join(", ")
        ))
        .execute(&mut *tx)
        .await?;

        let placeholders = vec!["?"; table.n_columns()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", quote_ident(name), placeholders);

        for row in 0..table.n_rows() {
            let mut query = sqlx::query(&insert);
            for column in table.columns() {
                query = match column.data() {
                    ColumnData::Numeric(v) => query.bind(v[row]),
                    ColumnData::Categorical(v) => query.bind(v[row].clone()),
                };
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            table = name,
            rows = table.n_rows(),
            columns = table.n_columns(),
            "table written"
        );
        Ok(())
    }

    /// Read every row of table `name`.
    pub async fn read_table(&self, name: &str) -> Result<Table> {
        let info = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(name)))
            .fetch_all(&self.pool)
            .await?;

        if info.is_empty() {
            return Err(PipelineError::MissingTable(name.to_string()));
        }

        let mut schema = Vec::with_capacity(info.len());
        for row in &info {
            let column: String = row.try_get_unchecked("name")?;
            let declared: String = row.try_get_unchecked("type")?;
            schema.push((column, is_numeric_affinity(&declared)));
        }

        let rows = sqlx::query(&format!("SELECT * FROM {}", quote_ident(name)))
            .fetch_all(&self.pool)
            .await?;

        let mut columns = Vec::with_capacity(schema.len());
        for (idx, (column, numeric)) in schema.into_iter().enumerate() {
            let data = if numeric {
                let mut values = Vec::with_capacity(rows.len());
                for row in &rows {
                    values.push(row.try_get_unchecked::<Option<f64>, _>(idx)?);
                }
                ColumnData::Numeric(values)
            } else {
                let mut values = Vec::with_capacity(rows.len());
                for row in &rows {
                    values.push(row.try_get_unchecked::<Option<String>, _>(idx)?);
                }
                ColumnData::Categorical(values)
            };
            columns.push(Column::new(column, data));
        }

        let table = Table::from_columns(columns)?;

        tracing::info!(table = name, rows = table.n_rows(), "table loaded");
        Ok(table)
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Quote an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQLite affinity rules: text-like declarations and untyped columns are
/// categorical, everything else is numeric.
fn is_numeric_affinity(declared: &str) -> bool {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        return true;
    }
    if upper.is_empty()
        || upper.contains("CHAR")
        || upper.contains("CLOB")
        || upper.contains("TEXT")
        || upper.contains("BLOB")
    {
        return false;
    }
    true
}
