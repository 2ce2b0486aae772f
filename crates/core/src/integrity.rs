//! Referential integrity verification of generated data

use std::collections::{HashMap, HashSet};

use crate::catalog::Table;
use crate::error::CoreError;
use crate::records::{SqlValue, TableSource};

/// Primary-key values of every table a set of sources provides
struct KeyIndex {
    keys: HashMap<Table, HashSet<String>>,
}

impl KeyIndex {
    fn build(sources: &[&dyn TableSource]) -> Self {
        let mut keys: HashMap<Table, HashSet<String>> = HashMap::new();
        for source in sources {
            for table in source.tables() {
                let Some(position) = table.def().columns.iter().position(|c| c.primary_key) else {
                    continue;
                };
                let entry = keys.entry(table).or_default();
                for row in source.rows(table) {
                    if let Some(SqlValue::Text(Some(key))) = row.get(position) {
                        entry.insert(key.clone());
                    }
                }
            }
        }
        Self { keys }
    }

    fn contains(&self, table: Table, key: &str) -> bool {
        self.keys.get(&table).is_some_and(|keys| keys.contains(key))
    }
}

/// Check that every foreign key of `data` resolves to a row of `data` or
/// of `reference`.
///
/// Returns the first dangling reference found.
pub fn verify(data: &dyn TableSource, reference: &dyn TableSource) -> Result<(), CoreError> {
    let index = KeyIndex::build(&[data, reference]);

    for table in data.tables() {
        let def = table.def();
        let foreign_keys: Vec<(usize, &'static str, Table)> = def
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.references.map(|parent| (i, c.name, parent)))
            .collect();
        if foreign_keys.is_empty() {
            continue;
        }

        for row in data.rows(table) {
            for &(position, column, parent) in &foreign_keys {
                if let Some(SqlValue::Text(Some(value))) = row.get(position) {
                    if !index.contains(parent, value) {
                        return Err(CoreError::Integrity {
                            table: def.name,
                            column,
                            value: value.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(())
}
