//! Tiered bulk loader
//!
//! Tables are written tier by tier. Tables of one tier share no foreign key,
//! so they are inserted concurrently, each on its own pooled connection, and
//! the next tier starts only when all of them have committed.

use std::collections::BTreeMap;

use deadpool_postgres::Pool;
use futures::future::try_join_all;
use mimic_core::{ColumnType, SqlValue, Table, TableDef, TableSource, load_tiers};
use tokio_postgres::types::ToSql;

use crate::error::SeedError;

/// PostgreSQL accepts at most this many bind parameters per statement
const MAX_BIND_PARAMETERS: usize = 65_535;

/// Rows inserted per table by one `load` call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: BTreeMap<Table, u64>,
}

impl LoadReport {
    pub fn total(&self) -> u64 {
        self.rows.values().sum()
    }
}

/// Placeholder for parameter `n`, cast so the server checks the value type
fn placeholder(n: usize, ty: ColumnType) -> String {
    match ty {
        ColumnType::Text => format!("${n}::text"),
        ColumnType::Timestamp => format!("${n}::timestamptz"),
        ColumnType::Boolean => format!("${n}::boolean"),
        ColumnType::Integer => format!("${n}::int4"),
        ColumnType::Real => format!("${n}::float4"),
        ColumnType::Enum(domain) => format!("${n}::text::{}", domain.type_name()),
    }
}

/// Multi-row `INSERT` for `rows` rows of `def`
pub fn insert_statement(def: &TableDef, rows: usize) -> String {
    let columns: Vec<&str> = def.columns.iter().map(|c| c.name).collect();
    let width = def.columns.len();
    let tuples: Vec<String> = (0..rows)
        .map(|row| {
            let values: Vec<String> = def
                .columns
                .iter()
                .enumerate()
                .map(|(i, column)| placeholder(row * width + i + 1, column.ty))
                .collect();
            format!("({})", values.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        def.name,
        columns.join(", "),
        tuples.join(", ")
    )
}

/// Rows per statement that keep a table under the bind-parameter limit
pub fn rows_per_statement(def: &TableDef) -> usize {
    (MAX_BIND_PARAMETERS / def.columns.len().max(1)).max(1)
}

fn bind(value: &SqlValue) -> &(dyn ToSql + Sync) {
    match value {
        SqlValue::Text(v) => v,
        SqlValue::Timestamp(v) => v,
        SqlValue::Bool(v) => v,
        SqlValue::Int(v) => v,
        SqlValue::Real(v) => v,
    }
}

/// Writes table sources into PostgreSQL
#[derive(Clone)]
pub struct BulkLoader {
    pool: Pool,
}

impl BulkLoader {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Insert every table of `source`, parents before children
    pub async fn load<S>(&self, source: &S) -> Result<LoadReport, SeedError>
    where
        S: TableSource + ?Sized,
    {
        let mut report = LoadReport::default();
        for tier in load_tiers(&source.tables())? {
            let writes = tier
                .into_iter()
                .map(|table| self.insert_table(table, source.rows(table)));
            for (table, count) in try_join_all(writes).await? {
                report.rows.insert(table, count);
            }
        }
        Ok(report)
    }

    async fn insert_table(
        &self,
        table: Table,
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<(Table, u64), SeedError> {
        if rows.is_empty() {
            return Ok((table, 0));
        }

        let def = table.def();
        let client = self.pool.get().await?;
        let mut inserted = 0;
        for chunk in rows.chunks(rows_per_statement(def)) {
            let statement = insert_statement(def, chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> = chunk.iter().flatten().map(bind).collect();
            inserted += client.execute(statement.as_str(), &params).await?;
        }

        tracing::debug!(table = def.name, rows = inserted, "Inserted rows");
        Ok((table, inserted))
    }
}
