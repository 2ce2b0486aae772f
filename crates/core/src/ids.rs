//! Row identifiers
//!
//! Patients, admissions and ICU stays carry structured ids derived from their
//! position in the generation run, so ids of different batches never collide.
//! Every other row gets an opaque UUID drawn from the run's random source.

use rand::Rng;
use uuid::{Builder, Uuid};

pub fn patient_id(patient_index: u32) -> String {
    format!("P{}", 100_000 + u64::from(patient_index))
}

pub fn admission_id(patient_index: u32, admission_index: u32) -> String {
    format!(
        "A{}",
        200_000 + u64::from(patient_index) * 10 + u64::from(admission_index)
    )
}

pub fn icu_stay_id(patient_index: u32, admission_index: u32, icu_index: u32) -> String {
    format!(
        "I{}",
        300_000
            + u64::from(patient_index) * 100
            + u64::from(admission_index) * 10
            + u64::from(icu_index)
    )
}

/// Random v4 UUID taken from `rng`, so seeded runs reproduce their ids
pub fn opaque_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    let id: Uuid = Builder::from_random_bytes(bytes).into_uuid();
    id.to_string()
}
