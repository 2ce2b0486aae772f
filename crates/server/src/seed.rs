//! Seeding orchestrator
//!
//! A run recreates the dataset from scratch: it ensures the schema exists,
//! truncates every table, loads the reference catalogs, then generates,
//! verifies and loads one batch of patients at a time.

use std::time::{Duration, Instant};

use chrono::Utc;
use deadpool_postgres::{Client, Pool};
use mimic_core::{BatchGenerator, ReferenceData, Table, batch_rng, plan_batches, verify};

use crate::config::SeedSettings;
use crate::db::{BulkLoader, ensure_schema, truncate_all};
use crate::error::SeedError;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct SeedSummary {
    /// Seed the run used; rerunning with it reproduces the data
    pub seed: u64,
    pub batches: usize,
    pub reference_records: u64,
    pub generated_records: u64,
    /// Row count of every table after the run
    pub table_counts: Vec<(Table, i64)>,
    pub elapsed: Duration,
}

impl SeedSummary {
    pub fn count(&self, table: Table) -> i64 {
        self.table_counts
            .iter()
            .find(|(t, _)| *t == table)
            .map_or(0, |(_, count)| *count)
    }

    pub fn records_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            (self.reference_records + self.generated_records) as f64 / seconds
        } else {
            0.0
        }
    }
}

pub struct Seeder {
    pool: Pool,
    settings: SeedSettings,
}

impl Seeder {
    pub fn new(pool: Pool, settings: SeedSettings) -> Self {
        Self { pool, settings }
    }

    pub async fn run(&self) -> Result<SeedSummary, SeedError> {
        let started = Instant::now();
        let generation = &self.settings.generation;
        let seed = self.settings.seed.unwrap_or_else(|| {
            let seed = rand::random();
            tracing::info!(seed, "No SEED_RANDOM_SEED set, drew a random seed");
            seed
        });

        tracing::info!(
            seed,
            patients = generation.patients,
            batch_size = generation.batch_size,
            "Starting seeding run"
        );

        {
            let client = self.pool.get().await?;
            ensure_schema(&client).await?;
            truncate_all(&client).await?;
        }

        let loader = BulkLoader::new(self.pool.clone());
        let reference = ReferenceData::standard();
        let report = loader.load(&reference).await?;
        let reference_records = report.total();
        tracing::info!(records = reference_records, "Reference data loaded");

        let generator = BatchGenerator::new(generation, &reference, Utc::now())?;
        let batches = plan_batches(generation.patients, generation.batch_size);
        let mut generated_records = 0;

        for (index, patients) in batches.iter().enumerate() {
            let batch_started = Instant::now();
            let batch = generator.generate(&mut batch_rng(seed, index as u64), patients.clone());
            verify(&batch, &reference)?;

            let report = loader.load(&batch).await?;
            generated_records += report.total();
            tracing::info!(
                batch = index + 1,
                of = batches.len(),
                first_patient = patients.start,
                patients = patients.len(),
                records = report.total(),
                elapsed_ms = batch_started.elapsed().as_millis() as u64,
                "Batch loaded"
            );
        }

        let table_counts = count_rows(&self.pool.get().await?).await?;
        let summary = SeedSummary {
            seed,
            batches: batches.len(),
            reference_records,
            generated_records,
            table_counts,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            seed,
            batches = summary.batches,
            records = summary.reference_records + summary.generated_records,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            records_per_second = summary.records_per_second(),
            "Seeding complete"
        );
        Ok(summary)
    }
}

async fn count_rows(client: &Client) -> Result<Vec<(Table, i64)>, SeedError> {
    let mut counts = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        let row = client
            .query_one(format!("SELECT count(*) FROM {}", table.name()).as_str(), &[])
            .await?;
        counts.push((table, row.get(0)));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(elapsed: Duration) -> SeedSummary {
        SeedSummary {
            seed: 1,
            batches: 2,
            reference_records: 43,
            generated_records: 957,
            table_counts: vec![(Table::Patients, 10), (Table::Admissions, 24)],
            elapsed,
        }
    }

    #[test]
    fn test_records_per_second() {
        let s = summary(Duration::from_secs(2));
        assert!((s.records_per_second() - 500.0).abs() < f64::EPSILON);
        assert_eq!(summary(Duration::ZERO).records_per_second(), 0.0);
    }

    #[test]
    fn test_count_lookup() {
        let s = summary(Duration::from_secs(1));
        assert_eq!(s.count(Table::Admissions), 24);
        assert_eq!(s.count(Table::ChartEvents), 0);
    }
}
