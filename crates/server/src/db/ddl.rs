//! Schema management rendered from the catalog
//!
//! Every statement is idempotent so `ensure_schema` can run before each
//! seeding pass.

use deadpool_postgres::Client;
use mimic_core::{Column, ColumnType, CoreError, Domain, Table, TableDef, load_tiers};

use crate::error::SeedError;

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Text => "TEXT",
        ColumnType::Timestamp => "TIMESTAMPTZ",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::Integer => "INTEGER",
        ColumnType::Real => "REAL",
        ColumnType::Enum(domain) => domain.type_name(),
    }
}

/// `CREATE TYPE` for a domain, skipped when the type already exists
pub fn render_enum(domain: Domain) -> String {
    let values: Vec<String> = domain.values().iter().map(|v| quote_literal(v)).collect();
    format!(
        "DO $$ BEGIN CREATE TYPE {} AS ENUM ({}); EXCEPTION WHEN duplicate_object THEN NULL; END $$;",
        domain.type_name(),
        values.join(", ")
    )
}

fn render_column(column: &Column) -> String {
    let mut sql = format!("{} {}", column.name, sql_type(column.ty));
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(parent) = column.references {
        let def = parent.def();
        let key = def.primary_key().map_or("id", |c| c.name);
        sql.push_str(&format!(" REFERENCES {} ({})", def.name, key));
    }
    sql
}

pub fn render_table(def: &TableDef) -> String {
    let columns: Vec<String> = def.columns.iter().map(render_column).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        def.name,
        columns.join(",\n    ")
    )
}

pub fn render_indexes(def: &TableDef) -> Vec<String> {
    def.indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
                index.name, def.name, index.column
            )
        })
        .collect()
}

/// All DDL for the catalog: enum types, tables in dependency order, indexes
pub fn schema_statements() -> Result<Vec<String>, CoreError> {
    let tables: Vec<Table> = load_tiers(&Table::ALL)?.into_iter().flatten().collect();

    let mut statements: Vec<String> = Domain::ALL.iter().map(|d| render_enum(*d)).collect();
    statements.extend(tables.iter().map(|t| render_table(t.def())));
    statements.extend(tables.iter().flat_map(|t| render_indexes(t.def())));
    Ok(statements)
}

/// One `TRUNCATE` over every catalog table, children first
pub fn truncate_statement() -> Result<String, CoreError> {
    let names: Vec<&str> = load_tiers(&Table::ALL)?
        .into_iter()
        .rev()
        .flatten()
        .map(Table::name)
        .collect();
    Ok(format!("TRUNCATE TABLE {};", names.join(", ")))
}

pub async fn ensure_schema(client: &Client) -> Result<(), SeedError> {
    let statements = schema_statements()?;
    client.batch_execute(&statements.join("\n")).await?;
    tracing::debug!(statements = statements.len(), "Schema ensured");
    Ok(())
}

pub async fn truncate_all(client: &Client) -> Result<(), SeedError> {
    client.batch_execute(&truncate_statement()?).await?;
    tracing::info!(tables = Table::ALL.len(), "Truncated all tables");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_is_idempotent() {
        let sql = render_enum(Domain::Gender);
        assert!(sql.contains("CREATE TYPE gender AS ENUM ('M', 'F')"));
        assert!(sql.contains("duplicate_object"));
    }

    #[test]
    fn test_render_admissions() {
        let sql = render_table(Table::Admissions.def());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS admissions ("));
        assert!(sql.contains("admission_id TEXT PRIMARY KEY"));
        assert!(sql.contains("subject_id TEXT NOT NULL REFERENCES patients (subject_id)"));
        assert!(sql.contains("admission_type admission_type NOT NULL"));
        assert!(sql.contains("discharge_time TIMESTAMPTZ,"));
    }

    #[test]
    fn test_render_indexes() {
        let sql = render_indexes(Table::Patients.def());
        assert!(
            sql.contains(&"CREATE INDEX IF NOT EXISTS patient_gender_idx ON patients (gender);".to_string())
        );
    }

    #[test]
    fn test_tables_created_after_parents() {
        let statements = schema_statements().unwrap();
        let position = |needle: &str| {
            statements
                .iter()
                .position(|s| s.starts_with(&format!("CREATE TABLE IF NOT EXISTS {needle} (")))
                .unwrap()
        };
        assert!(position("patients") < position("admissions"));
        assert!(position("admissions") < position("icustays"));
        assert!(position("icustays") < position("chartevents"));
        assert!(position("d_items") < position("chartevents"));

        let last_enum = statements
            .iter()
            .rposition(|s| s.starts_with("DO $$"))
            .unwrap();
        assert!(last_enum < position("patients"));
    }

    #[test]
    fn test_truncate_lists_children_first() {
        let sql = truncate_statement().unwrap();
        let chart = sql.find("chartevents").unwrap();
        let admissions = sql.find("admissions").unwrap();
        let patients = sql.find(" patients").unwrap();
        assert!(chart < admissions);
        assert!(admissions < patients);
        for table in Table::ALL {
            assert!(sql.contains(table.name()));
        }
    }
}
