//! Batch entity generator
//!
//! A batch is the complete entity sub-graph of a contiguous range of patient
//! indices. Generation walks the dependency graph top-down: patient, its
//! admissions, then every admission-scoped entity, then chart events inside
//! each ICU stay. Nothing is shared between patients, so any batch can be
//! produced in isolation from its own random stream.

use std::ops::Range;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::catalog::Table;
use crate::config::{CountRange, GenerationConfig};
use crate::domain::{
    AdmissionType, CareUnit, Gender, InsuranceType, Interpretation, MaritalStatus, NoteCategory,
    TransferEventType,
};
use crate::error::CoreError;
use crate::ids::{admission_id, icu_stay_id, opaque_id, patient_id};
use crate::random::{birthdate, instant_between, int_between, past, pick};
use crate::records::{
    Admission, ChartEvent, DiagnosisIcd, IcdCoding, IcuStay, LabEvent, MicrobiologyEvent,
    NoteEvent, Patient, Prescription, ProcedureIcd, SqlValue, TableSource, Transfer, encode,
};
use crate::reference::{
    ADMISSION_LOCATIONS, ANTIBIOTICS, DISCHARGE_LOCATIONS, DOSE_UNITS, ETHNICITIES, LANGUAGES,
    MEDICATIONS, MICROORGANISMS, NOTE_DESCRIPTIONS, RELIGIONS, ROUTES, ReferenceData,
    SPECIMEN_TYPES,
};
use crate::text;
use crate::values::{format_value, lab_value, vital_value};

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 95;
const STAY_DAYS: CountRange = CountRange::new(1, 21);
const ICU_DAYS: CountRange = CountRange::new(1, 10);
const ED_HOURS: CountRange = CountRange::new(1, 6);
const NOTE_PARAGRAPHS: CountRange = CountRange::new(2, 8);

const ADMISSION_TYPES: &[AdmissionType] = &[
    AdmissionType::Emergency,
    AdmissionType::Urgent,
    AdmissionType::Elective,
];

const MARITAL_STATUSES: &[MaritalStatus] = &[
    MaritalStatus::Married,
    MaritalStatus::Single,
    MaritalStatus::Widowed,
    MaritalStatus::Divorced,
];

const ADULT_CARE_UNITS: &[CareUnit] = &[
    CareUnit::Micu,
    CareUnit::Sicu,
    CareUnit::Tsicu,
    CareUnit::Ccu,
    CareUnit::Csru,
];

/// Split `0..patients` into contiguous ranges of at most `batch_size`
pub fn plan_batches(patients: u32, batch_size: u32) -> Vec<Range<u32>> {
    if batch_size == 0 {
        return Vec::new();
    }
    (0..patients)
        .step_by(batch_size as usize)
        .map(|start| start..start.saturating_add(batch_size).min(patients))
        .collect()
}

/// All rows generated for one range of patients
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub patients: Vec<Patient>,
    pub admissions: Vec<Admission>,
    pub icu_stays: Vec<IcuStay>,
    pub transfers: Vec<Transfer>,
    pub diagnoses: Vec<DiagnosisIcd>,
    pub procedures: Vec<ProcedureIcd>,
    pub prescriptions: Vec<Prescription>,
    pub lab_events: Vec<LabEvent>,
    pub chart_events: Vec<ChartEvent>,
    pub note_events: Vec<NoteEvent>,
    pub microbiology_events: Vec<MicrobiologyEvent>,
}

impl Batch {
    pub const TABLES: [Table; 11] = [
        Table::Patients,
        Table::Admissions,
        Table::IcuStays,
        Table::Transfers,
        Table::DiagnosesIcd,
        Table::ProceduresIcd,
        Table::Prescriptions,
        Table::LabEvents,
        Table::ChartEvents,
        Table::NoteEvents,
        Table::MicrobiologyEvents,
    ];

    pub fn count(&self, table: Table) -> usize {
        match table {
            Table::Patients => self.patients.len(),
            Table::Admissions => self.admissions.len(),
            Table::IcuStays => self.icu_stays.len(),
            Table::Transfers => self.transfers.len(),
            Table::DiagnosesIcd => self.diagnoses.len(),
            Table::ProceduresIcd => self.procedures.len(),
            Table::Prescriptions => self.prescriptions.len(),
            Table::LabEvents => self.lab_events.len(),
            Table::ChartEvents => self.chart_events.len(),
            Table::NoteEvents => self.note_events.len(),
            Table::MicrobiologyEvents => self.microbiology_events.len(),
            _ => 0,
        }
    }

    pub fn total_records(&self) -> usize {
        Self::TABLES.iter().map(|&t| self.count(t)).sum()
    }
}

impl TableSource for Batch {
    fn tables(&self) -> Vec<Table> {
        Self::TABLES.to_vec()
    }

    fn rows(&self, table: Table) -> Vec<Vec<SqlValue>> {
        match table {
            Table::Patients => encode(&self.patients),
            Table::Admissions => encode(&self.admissions),
            Table::IcuStays => encode(&self.icu_stays),
            Table::Transfers => encode(&self.transfers),
            Table::DiagnosesIcd => encode(&self.diagnoses),
            Table::ProceduresIcd => encode(&self.procedures),
            Table::Prescriptions => encode(&self.prescriptions),
            Table::LabEvents => encode(&self.lab_events),
            Table::ChartEvents => encode(&self.chart_events),
            Table::NoteEvents => encode(&self.note_events),
            Table::MicrobiologyEvents => encode(&self.microbiology_events),
            _ => Vec::new(),
        }
    }
}

/// Produces batches for one seeding run
#[derive(Debug, Clone)]
pub struct BatchGenerator<'a> {
    config: &'a GenerationConfig,
    reference: &'a ReferenceData,
    now: DateTime<Utc>,
}

impl<'a> BatchGenerator<'a> {
    pub fn new(
        config: &'a GenerationConfig,
        reference: &'a ReferenceData,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let empty = [
            ("diagnosis codes", reference.diagnosis_codes.is_empty()),
            ("procedure codes", reference.procedure_codes.is_empty()),
            ("lab items", reference.lab_items.is_empty()),
            ("chart items", reference.chart_items.is_empty()),
        ];
        if let Some((name, _)) = empty.iter().find(|(_, is_empty)| *is_empty) {
            return Err(CoreError::InvalidConfig(format!(
                "reference catalog of {name} is empty"
            )));
        }

        Ok(Self {
            config,
            reference,
            now,
        })
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, patients: Range<u32>) -> Batch {
        let mut batch = Batch::default();
        for patient_index in patients {
            self.patient(rng, patient_index, &mut batch);
        }
        batch
    }

    fn count<R: Rng + ?Sized>(rng: &mut R, range: CountRange) -> u32 {
        int_between(rng, range.min, range.max)
    }

    fn patient<R: Rng + ?Sized>(&self, rng: &mut R, patient_index: u32, batch: &mut Batch) {
        let subject_id = patient_id(patient_index);
        let gender = *pick(rng, Gender::ALL);
        let date_of_birth = birthdate(rng, MIN_AGE, MAX_AGE, self.now);
        let expired = rng.random_bool(self.config.mortality_rate);

        let mut latest_death: Option<DateTime<Utc>> = None;
        let mut latest_discharge = date_of_birth;
        let admissions = Self::count(rng, self.config.admissions_per_patient);
        for admission_index in 0..admissions {
            let admission =
                self.admission(rng, patient_index, admission_index, &subject_id, expired, batch);
            latest_death = latest_death.max(admission.death_time);
            let discharged = admission.discharge_time.unwrap_or(admission.admit_time);
            latest_discharge = latest_discharge.max(discharged);
            batch.admissions.push(admission);
        }

        // Death outside hospital follows the last discharge
        let date_of_death = match latest_death {
            Some(death_time) => Some(death_time),
            None if expired => Some(instant_between(rng, latest_discharge, self.now)),
            None => None,
        };

        batch.patients.push(Patient {
            subject_id,
            gender,
            date_of_birth,
            date_of_death,
            expire_flag: expired,
        });
    }

    fn admission<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        patient_index: u32,
        admission_index: u32,
        subject_id: &str,
        expired: bool,
        batch: &mut Batch,
    ) -> Admission {
        let id = admission_id(patient_index, admission_index);
        let admit_time = past(rng, self.config.history_years, self.now);
        let stay = TimeDelta::days(i64::from(Self::count(rng, STAY_DAYS)));
        let mut discharge_time = (admit_time + stay).min(self.now);

        let fatal = expired && rng.random_bool(self.config.fatal_admission_rate);
        let death_time = fatal.then(|| instant_between(rng, admit_time, discharge_time));
        if let Some(death_time) = death_time {
            discharge_time = death_time;
        }

        let admission_type = *pick(rng, ADMISSION_TYPES);
        let (ed_reg_time, ed_out_time) = if admission_type == AdmissionType::Emergency {
            let hours = TimeDelta::hours(i64::from(Self::count(rng, ED_HOURS)));
            (Some(admit_time - hours), Some(admit_time))
        } else {
            (None, None)
        };

        let admission_location = pick(rng, ADMISSION_LOCATIONS).to_string();
        let discharge_location = (!fatal).then(|| pick(rng, DISCHARGE_LOCATIONS).to_string());
        let insurance = *pick(rng, InsuranceType::ALL);
        let language = pick(rng, LANGUAGES).to_string();
        let religion = Some(pick(rng, RELIGIONS).to_string());
        let marital_status = *pick(rng, MARITAL_STATUSES);
        let ethnicity = pick(rng, ETHNICITIES).to_string();
        let diagnosis = Some(text::sentence(rng));

        let window = Window {
            subject_id,
            admission_id: &id,
            start: admit_time,
            end: discharge_time,
        };

        self.codings(rng, &window, batch);
        self.prescriptions(rng, &window, batch);
        self.lab_events(rng, &window, batch);
        self.notes(rng, &window, batch);
        self.microbiology(rng, &window, batch);

        let stays = self.icu_stays(rng, patient_index, admission_index, &window);
        let chart_events_before = batch.chart_events.len();
        for stay in &stays {
            self.chart_events(rng, stay, batch);
        }
        let has_chartevents_data = batch.chart_events.len() > chart_events_before;
        self.transfers(rng, &window, &stays, batch);
        batch.icu_stays.extend(stays);

        Admission {
            admission_id: id,
            subject_id: subject_id.to_string(),
            admit_time,
            discharge_time: Some(discharge_time),
            death_time,
            admission_type,
            admission_location,
            discharge_location,
            insurance,
            language,
            religion,
            marital_status,
            ethnicity,
            ed_reg_time,
            ed_out_time,
            diagnosis,
            hospital_expire_flag: fatal,
            has_chartevents_data,
        }
    }

    fn codings<R: Rng + ?Sized>(&self, rng: &mut R, window: &Window<'_>, batch: &mut Batch) {
        let diagnoses = Self::count(rng, self.config.diagnoses_per_admission);
        for seq in 1..=diagnoses {
            let code = pick(rng, &self.reference.diagnosis_codes);
            batch.diagnoses.push(DiagnosisIcd(IcdCoding {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                seq_num: seq as i32,
                icd9_code: code.0.icd9_code.clone(),
            }));
        }

        let procedures = Self::count(rng, self.config.procedures_per_admission);
        for seq in 1..=procedures {
            let code = pick(rng, &self.reference.procedure_codes);
            batch.procedures.push(ProcedureIcd(IcdCoding {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                seq_num: seq as i32,
                icd9_code: code.0.icd9_code.clone(),
            }));
        }
    }

    fn prescriptions<R: Rng + ?Sized>(&self, rng: &mut R, window: &Window<'_>, batch: &mut Batch) {
        let count = Self::count(rng, self.config.prescriptions_per_admission);
        for _ in 0..count {
            let start_date = window.instant(rng);
            let end_date = instant_between(rng, start_date, window.end);
            let drug = pick(rng, MEDICATIONS).to_string();
            batch.prescriptions.push(Prescription {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                start_date,
                end_date,
                drug_name_generic: Some(drug.clone()),
                drug,
                dose_val_rx: Some(int_between(rng, 1, 100).to_string()),
                dose_unit_rx: Some(pick(rng, DOSE_UNITS).to_string()),
                route: Some(pick(rng, ROUTES).to_string()),
            });
        }
    }

    fn lab_events<R: Rng + ?Sized>(&self, rng: &mut R, window: &Window<'_>, batch: &mut Batch) {
        let count = Self::count(rng, self.config.lab_events_per_admission);
        for _ in 0..count {
            let item = pick(rng, &self.reference.lab_items);
            let chart_time = window.instant(rng);
            let result = lab_value(rng, &item.item_id);
            batch.lab_events.push(LabEvent {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                item_id: item.item_id.clone(),
                chart_time,
                value: Some(format_value(result.value_num)),
                value_num: Some(result.value_num as f32),
                value_uom: Some(result.unit.to_string()),
                flag: Some(result.flag),
            });
        }
    }

    fn notes<R: Rng + ?Sized>(&self, rng: &mut R, window: &Window<'_>, batch: &mut Batch) {
        let count = Self::count(rng, self.config.notes_per_admission);
        for _ in 0..count {
            let chart_date = window.instant(rng);
            let category = *pick(rng, NoteCategory::ALL);
            let description = pick(rng, NOTE_DESCRIPTIONS).to_string();
            let paragraphs = Self::count(rng, NOTE_PARAGRAPHS);
            batch.note_events.push(NoteEvent {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                chart_date,
                chart_time: Some(chart_date),
                category,
                description,
                cgid: Some(caregiver(rng)),
                is_error: false,
                text: Some(text::paragraphs(rng, paragraphs)),
            });
        }
    }

    fn microbiology<R: Rng + ?Sized>(&self, rng: &mut R, window: &Window<'_>, batch: &mut Batch) {
        let count = Self::count(rng, self.config.microbiology_per_admission);
        for _ in 0..count {
            let chart_date = window.instant(rng);
            let spec_type_desc = Some(pick(rng, SPECIMEN_TYPES).to_string());
            let org_name = rng
                .random_bool(self.config.organism_rate)
                .then(|| pick(rng, MICROORGANISMS).to_string());
            batch.microbiology_events.push(MicrobiologyEvent {
                id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                chart_date,
                spec_type_desc,
                isolate_num: org_name.as_ref().map(|_| 1),
                org_name,
                ab_name: Some(pick(rng, ANTIBIOTICS).to_string()),
                interpretation: Some(*pick(rng, Interpretation::ALL)),
                comments: Some(text::sentence(rng)),
            });
        }
    }

    /// ICU stays in disjoint, ordered slots of the admission window
    fn icu_stays<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        patient_index: u32,
        admission_index: u32,
        window: &Window<'_>,
    ) -> Vec<IcuStay> {
        let count = Self::count(rng, self.config.icu_stays_per_admission);
        if count == 0 {
            return Vec::new();
        }

        let slot = (window.end - window.start) / count as i32;
        (0..count)
            .map(|icu_index| {
                let slot_start = window.start + slot * icu_index as i32;
                let slot_end = if icu_index + 1 == count {
                    window.end
                } else {
                    slot_start + slot
                };
                let in_time = instant_between(rng, slot_start, slot_end);
                let nominal = TimeDelta::days(i64::from(Self::count(rng, ICU_DAYS)));
                let out_time = (in_time + nominal).min(slot_end);
                IcuStay {
                    icu_stay_id: icu_stay_id(patient_index, admission_index, icu_index),
                    subject_id: window.subject_id.to_string(),
                    admission_id: window.admission_id.to_string(),
                    care_unit: *pick(rng, ADULT_CARE_UNITS),
                    in_time,
                    out_time: Some(out_time),
                    length_of_stay: Some(days(out_time - in_time)),
                }
            })
            .collect()
    }

    fn chart_events<R: Rng + ?Sized>(&self, rng: &mut R, stay: &IcuStay, batch: &mut Batch) {
        let out_time = stay.out_time.unwrap_or(stay.in_time);
        let count = Self::count(rng, self.config.chart_events_per_icu_stay);
        for _ in 0..count {
            let item = pick(rng, &self.reference.chart_items);
            let chart_time = instant_between(rng, stay.in_time, out_time);
            let store_delay = TimeDelta::minutes(i64::from(int_between(rng, 0, 30)));
            let value_num = vital_value(rng, &item.item_id);
            batch.chart_events.push(ChartEvent {
                id: opaque_id(rng),
                subject_id: stay.subject_id.clone(),
                admission_id: stay.admission_id.clone(),
                icu_stay_id: Some(stay.icu_stay_id.clone()),
                item_id: item.item_id.clone(),
                chart_time,
                store_time: Some((chart_time + store_delay).min(self.now)),
                cgid: Some(caregiver(rng)),
                value: Some(format_value(value_num)),
                value_num: Some(value_num as f32),
                value_uom: item.unitname.clone(),
                warning: false,
                error: false,
            });
        }
    }

    /// ADMIT, one TRANSFER per ICU stay, then DISCHARGE
    fn transfers<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        window: &Window<'_>,
        stays: &[IcuStay],
        batch: &mut Batch,
    ) {
        let first_move = stays.first().map_or(window.end, |s| s.in_time);
        let mut events = vec![(TransferEventType::Admit, None, window.start, Some(first_move))];
        events.extend(stays.iter().map(|stay| {
            (
                TransferEventType::Transfer,
                Some(stay.care_unit),
                stay.in_time,
                stay.out_time,
            )
        }));
        events.push((TransferEventType::Discharge, None, window.end, None));

        for (event_type, care_unit, in_time, out_time) in events {
            // Ward transfers carry a ward number, ICU moves carry the unit
            let ward_id = care_unit
                .is_none()
                .then(|| int_between(rng, 1, 60).to_string());
            batch.transfers.push(Transfer {
                transfer_id: opaque_id(rng),
                subject_id: window.subject_id.to_string(),
                admission_id: window.admission_id.to_string(),
                event_type,
                care_unit: care_unit.map(|u: CareUnit| u.as_str().to_string()),
                ward_id,
                in_time,
                out_time,
                length_of_stay: out_time.map(|out| hours(out - in_time)),
            });
        }
    }
}

/// Time bounds and owner ids of one admission
struct Window<'a> {
    subject_id: &'a str,
    admission_id: &'a str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window<'_> {
    fn instant<R: Rng + ?Sized>(&self, rng: &mut R) -> DateTime<Utc> {
        instant_between(rng, self.start, self.end)
    }
}

fn caregiver<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("CG{}", int_between(rng, 1000, 9999))
}

fn days(span: TimeDelta) -> f32 {
    (span.num_seconds() as f64 / 86_400.0) as f32
}

fn hours(span: TimeDelta) -> f32 {
    (span.num_seconds() as f64 / 3_600.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::batch_rng;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_plan_batches() {
        assert_eq!(plan_batches(10, 5), vec![0..5, 5..10]);
        assert_eq!(plan_batches(12, 5), vec![0..5, 5..10, 10..12]);
        assert_eq!(plan_batches(3, 50), vec![0..3]);
        assert!(plan_batches(0, 50).is_empty());
        assert!(plan_batches(10, 0).is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(BatchGenerator::new(&config, &reference, now()).is_err());
    }

    #[test]
    fn test_rejects_empty_catalog() {
        let mut reference = ReferenceData::standard();
        reference.lab_items.clear();
        let config = GenerationConfig::default();
        let err = BatchGenerator::new(&config, &reference, now()).unwrap_err();
        assert!(err.to_string().contains("lab items"));
    }

    #[test]
    fn test_patient_range_ids() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig::default();
        let generator = BatchGenerator::new(&config, &reference, now()).unwrap();
        let batch = generator.generate(&mut batch_rng(1, 1), 5..8);
        let ids: Vec<&str> = batch.patients.iter().map(|p| p.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["P100005", "P100006", "P100007"]);
    }

    #[test]
    fn test_no_icu_stays_means_no_chart_events() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig {
            icu_stays_per_admission: CountRange::new(0, 0),
            ..Default::default()
        };
        let generator = BatchGenerator::new(&config, &reference, now()).unwrap();
        let batch = generator.generate(&mut batch_rng(2, 0), 0..20);
        assert!(batch.icu_stays.is_empty());
        assert!(batch.chart_events.is_empty());
        assert!(batch.admissions.iter().all(|a| !a.has_chartevents_data));
        // ADMIT and DISCHARGE only
        assert_eq!(batch.transfers.len(), batch.admissions.len() * 2);
    }

    #[test]
    fn test_death_outside_hospital_follows_last_discharge() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig {
            mortality_rate: 1.0,
            fatal_admission_rate: 0.0,
            ..Default::default()
        };
        let generator = BatchGenerator::new(&config, &reference, now()).unwrap();
        let batch = generator.generate(&mut batch_rng(4, 0), 0..200);

        for patient in &batch.patients {
            let died = patient.date_of_death.unwrap();
            assert!(died <= now());
            for admission in batch
                .admissions
                .iter()
                .filter(|a| a.subject_id == patient.subject_id)
            {
                assert!(!admission.hospital_expire_flag);
                assert!(
                    admission.admit_time <= died,
                    "{} admitted after death",
                    admission.admission_id
                );
                assert!(admission.discharge_time.unwrap() <= died);
            }
        }
    }

    #[test]
    fn test_in_hospital_death_sets_date_of_death() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig {
            mortality_rate: 1.0,
            fatal_admission_rate: 1.0,
            ..Default::default()
        };
        let generator = BatchGenerator::new(&config, &reference, now()).unwrap();
        let batch = generator.generate(&mut batch_rng(5, 0), 0..50);

        for patient in &batch.patients {
            let latest = batch
                .admissions
                .iter()
                .filter(|a| a.subject_id == patient.subject_id)
                .filter_map(|a| a.death_time)
                .max();
            assert!(latest.is_some());
            assert_eq!(patient.date_of_death, latest);
        }
    }

    #[test]
    fn test_total_records_sums_tables() {
        let reference = ReferenceData::standard();
        let config = GenerationConfig::default();
        let generator = BatchGenerator::new(&config, &reference, now()).unwrap();
        let batch = generator.generate(&mut batch_rng(3, 0), 0..4);
        let by_rows: usize = batch.tables().iter().map(|&t| batch.rows(t).len()).sum();
        assert_eq!(batch.total_records(), by_rows);
        assert_eq!(batch.count(Table::Patients), 4);
    }
}
