//! Generation configuration

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Inclusive bounds of a per-parent row count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min as usize..=self.max as usize).contains(&count)
    }
}

/// Everything that shapes a seeded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub patients: u32,
    pub batch_size: u32,
    pub admissions_per_patient: CountRange,
    pub icu_stays_per_admission: CountRange,
    pub diagnoses_per_admission: CountRange,
    pub procedures_per_admission: CountRange,
    pub lab_events_per_admission: CountRange,
    pub chart_events_per_icu_stay: CountRange,
    pub prescriptions_per_admission: CountRange,
    pub notes_per_admission: CountRange,
    pub microbiology_per_admission: CountRange,
    /// Share of patients flagged deceased
    pub mortality_rate: f64,
    /// Chance that an admission of a deceased patient ends in death
    pub fatal_admission_rate: f64,
    /// Chance that a microbiology event grew an organism
    pub organism_rate: f64,
    /// Admissions start within this many years before now
    pub history_years: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            patients: 1000,
            batch_size: 50,
            admissions_per_patient: CountRange::new(1, 4),
            icu_stays_per_admission: CountRange::new(0, 2),
            diagnoses_per_admission: CountRange::new(1, 5),
            procedures_per_admission: CountRange::new(0, 3),
            lab_events_per_admission: CountRange::new(5, 50),
            chart_events_per_icu_stay: CountRange::new(20, 200),
            prescriptions_per_admission: CountRange::new(1, 15),
            notes_per_admission: CountRange::new(1, 8),
            microbiology_per_admission: CountRange::new(0, 5),
            mortality_rate: 0.12,
            fatal_admission_rate: 0.5,
            organism_rate: 0.7,
            history_years: 5,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.batch_size == 0 {
            return Err(CoreError::InvalidConfig("batch_size must be positive".into()));
        }

        let ranges = [
            ("admissions_per_patient", self.admissions_per_patient),
            ("icu_stays_per_admission", self.icu_stays_per_admission),
            ("diagnoses_per_admission", self.diagnoses_per_admission),
            ("procedures_per_admission", self.procedures_per_admission),
            ("lab_events_per_admission", self.lab_events_per_admission),
            ("chart_events_per_icu_stay", self.chart_events_per_icu_stay),
            ("prescriptions_per_admission", self.prescriptions_per_admission),
            ("notes_per_admission", self.notes_per_admission),
            ("microbiology_per_admission", self.microbiology_per_admission),
        ];
        for (name, range) in ranges {
            if range.min > range.max {
                return Err(CoreError::InvalidConfig(format!(
                    "{name}: min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }

        // Structured ids reserve one decimal digit per admission and per ICU stay.
        if self.admissions_per_patient.max > 10 {
            return Err(CoreError::InvalidConfig(
                "admissions_per_patient.max must be at most 10".into(),
            ));
        }
        if self.icu_stays_per_admission.max > 10 {
            return Err(CoreError::InvalidConfig(
                "icu_stays_per_admission.max must be at most 10".into(),
            ));
        }

        let rates = [
            ("mortality_rate", self.mortality_rate),
            ("fatal_admission_rate", self.fatal_admission_rate),
            ("organism_rate", self.organism_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }

        Ok(())
    }
}
