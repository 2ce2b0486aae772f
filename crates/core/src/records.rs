//! Typed rows and their column-ordered encoding
//!
//! Each row struct mirrors one catalog table. `Record::values` emits one
//! `SqlValue` per catalog column, in catalog order, which is what the bulk
//! loader binds.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Table;
use crate::domain::{
    AdmissionType, CareUnit, DataSource, Gender, InsuranceType, Interpretation, LabFlag,
    MaritalStatus, NoteCategory, ParamType, TransferEventType,
};

/// A single bindable column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
    Bool(Option<bool>),
    Int(Option<i32>),
    Real(Option<f32>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Real(v) => v.is_none(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(Some(v.clone()))
    }
}

impl From<&Option<String>> for SqlValue {
    fn from(v: &Option<String>) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(Some(v))
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(Some(v))
    }
}

impl From<Option<bool>> for SqlValue {
    fn from(v: Option<bool>) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(v: Option<i32>) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Real(Some(v))
    }
}

impl From<Option<f32>> for SqlValue {
    fn from(v: Option<f32>) -> Self {
        SqlValue::Real(v)
    }
}

macro_rules! domain_values {
    ($($domain:ty),+ $(,)?) => {
        $(
            impl From<$domain> for SqlValue {
                fn from(v: $domain) -> Self {
                    SqlValue::Text(Some(v.as_str().to_string()))
                }
            }

            impl From<Option<$domain>> for SqlValue {
                fn from(v: Option<$domain>) -> Self {
                    SqlValue::Text(v.map(|d| d.as_str().to_string()))
                }
            }
        )+
    };
}

domain_values!(
    Gender,
    AdmissionType,
    InsuranceType,
    MaritalStatus,
    CareUnit,
    TransferEventType,
    LabFlag,
    DataSource,
    ParamType,
    NoteCategory,
    Interpretation,
);

const NULL_TEXT: SqlValue = SqlValue::Text(None);
const NULL_TIME: SqlValue = SqlValue::Timestamp(None);
const NULL_REAL: SqlValue = SqlValue::Real(None);

/// A row of one catalog table
pub trait Record {
    const TABLE: Table;

    /// One value per column of `TABLE`, in catalog order
    fn values(&self) -> Vec<SqlValue>;
}

/// Encode a slice of rows for the bulk loader
pub fn encode<R: Record>(rows: &[R]) -> Vec<Vec<SqlValue>> {
    rows.iter().map(R::values).collect()
}

/// Something the bulk loader can persist: a set of tables and their rows
pub trait TableSource {
    /// Tables this source populates (possibly with zero rows)
    fn tables(&self) -> Vec<Table>;

    /// Encoded rows of `table`; empty for tables the source does not own
    fn rows(&self, table: Table) -> Vec<Vec<SqlValue>>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub subject_id: String,
    pub gender: Gender,
    pub date_of_birth: DateTime<Utc>,
    pub date_of_death: Option<DateTime<Utc>>,
    pub expire_flag: bool,
}

impl Record for Patient {
    const TABLE: Table = Table::Patients;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.subject_id).into(),
            self.gender.into(),
            self.date_of_birth.into(),
            self.date_of_death.into(),
            self.expire_flag.into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub admission_id: String,
    pub subject_id: String,
    pub admit_time: DateTime<Utc>,
    pub discharge_time: Option<DateTime<Utc>>,
    pub death_time: Option<DateTime<Utc>>,
    pub admission_type: AdmissionType,
    pub admission_location: String,
    pub discharge_location: Option<String>,
    pub insurance: InsuranceType,
    pub language: String,
    pub religion: Option<String>,
    pub marital_status: MaritalStatus,
    pub ethnicity: String,
    pub ed_reg_time: Option<DateTime<Utc>>,
    pub ed_out_time: Option<DateTime<Utc>>,
    pub diagnosis: Option<String>,
    pub hospital_expire_flag: bool,
    pub has_chartevents_data: bool,
}

impl Admission {
    /// Last instant of the stay; open admissions end at `admit_time`
    pub fn window_end(&self) -> DateTime<Utc> {
        self.discharge_time.unwrap_or(self.admit_time)
    }
}

impl Record for Admission {
    const TABLE: Table = Table::Admissions;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.admission_id).into(),
            (&self.subject_id).into(),
            self.admit_time.into(),
            self.discharge_time.into(),
            self.death_time.into(),
            self.admission_type.into(),
            (&self.admission_location).into(),
            (&self.discharge_location).into(),
            self.insurance.into(),
            (&self.language).into(),
            (&self.religion).into(),
            self.marital_status.into(),
            (&self.ethnicity).into(),
            self.ed_reg_time.into(),
            self.ed_out_time.into(),
            (&self.diagnosis).into(),
            self.hospital_expire_flag.into(),
            self.has_chartevents_data.into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IcuStay {
    pub icu_stay_id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub care_unit: CareUnit,
    pub in_time: DateTime<Utc>,
    pub out_time: Option<DateTime<Utc>>,
    /// Days
    pub length_of_stay: Option<f32>,
}

impl Record for IcuStay {
    const TABLE: Table = Table::IcuStays;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.icu_stay_id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            self.care_unit.into(),
            self.in_time.into(),
            self.out_time.into(),
            self.length_of_stay.into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub transfer_id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub event_type: TransferEventType,
    pub care_unit: Option<String>,
    pub ward_id: Option<String>,
    pub in_time: DateTime<Utc>,
    pub out_time: Option<DateTime<Utc>>,
    /// Hours
    pub length_of_stay: Option<f32>,
}

impl Record for Transfer {
    const TABLE: Table = Table::Transfers;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.transfer_id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            self.event_type.into(),
            (&self.care_unit).into(),
            (&self.ward_id).into(),
            self.in_time.into(),
            self.out_time.into(),
            self.length_of_stay.into(),
        ]
    }
}

/// Row of `d_icd_diagnoses` or `d_icd_procedures`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IcdCode {
    pub icd9_code: String,
    pub short_title: String,
    pub long_title: String,
}

impl IcdCode {
    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.icd9_code).into(),
            (&self.short_title).into(),
            (&self.long_title).into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DiagnosisCode(pub IcdCode);

impl Record for DiagnosisCode {
    const TABLE: Table = Table::IcdDiagnosisCodes;

    fn values(&self) -> Vec<SqlValue> {
        self.0.values()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ProcedureCode(pub IcdCode);

impl Record for ProcedureCode {
    const TABLE: Table = Table::IcdProcedureCodes;

    fn values(&self) -> Vec<SqlValue> {
        self.0.values()
    }
}

/// Row of `diagnoses_icd` or `procedures_icd`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IcdCoding {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    /// 1-based rank within the admission
    pub seq_num: i32,
    pub icd9_code: String,
}

impl IcdCoding {
    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            self.seq_num.into(),
            (&self.icd9_code).into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DiagnosisIcd(pub IcdCoding);

impl Record for DiagnosisIcd {
    const TABLE: Table = Table::DiagnosesIcd;

    fn values(&self) -> Vec<SqlValue> {
        self.0.values()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ProcedureIcd(pub IcdCoding);

impl Record for ProcedureIcd {
    const TABLE: Table = Table::ProceduresIcd;

    fn values(&self) -> Vec<SqlValue> {
        self.0.values()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub drug: String,
    pub drug_name_generic: Option<String>,
    pub dose_val_rx: Option<String>,
    pub dose_unit_rx: Option<String>,
    pub route: Option<String>,
}

impl Record for Prescription {
    const TABLE: Table = Table::Prescriptions;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            NULL_TEXT, // icustay_id
            self.start_date.into(),
            self.end_date.into(),
            (&self.drug).into(),
            NULL_TEXT, // drug_name_poe
            (&self.drug_name_generic).into(),
            NULL_TEXT, // formulary_drug_cd
            NULL_TEXT, // gsn
            NULL_TEXT, // ndc
            NULL_TEXT, // prod_strength
            (&self.dose_val_rx).into(),
            (&self.dose_unit_rx).into(),
            NULL_TEXT, // form_val_disp
            NULL_TEXT, // form_unit_disp
            (&self.route).into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabItem {
    pub item_id: String,
    pub label: String,
    pub fluid: String,
    pub category: String,
    pub loinc_code: Option<String>,
}

impl Record for LabItem {
    const TABLE: Table = Table::LabItems;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.item_id).into(),
            (&self.label).into(),
            (&self.fluid).into(),
            (&self.category).into(),
            (&self.loinc_code).into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabEvent {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub item_id: String,
    pub chart_time: DateTime<Utc>,
    pub value: Option<String>,
    pub value_num: Option<f32>,
    pub value_uom: Option<String>,
    pub flag: Option<LabFlag>,
}

impl Record for LabEvent {
    const TABLE: Table = Table::LabEvents;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            (&self.item_id).into(),
            self.chart_time.into(),
            (&self.value).into(),
            self.value_num.into(),
            (&self.value_uom).into(),
            self.flag.into(),
        ]
    }
}

/// Row of `d_items`, the bedside chart item catalog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartItem {
    pub item_id: String,
    pub label: String,
    pub dbsource: DataSource,
    pub linksto: Option<String>,
    pub category: String,
    pub unitname: Option<String>,
    pub param_type: ParamType,
}

impl Record for ChartItem {
    const TABLE: Table = Table::ChartItems;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.item_id).into(),
            (&self.label).into(),
            NULL_TEXT, // abbreviation
            self.dbsource.into(),
            (&self.linksto).into(),
            (&self.category).into(),
            (&self.unitname).into(),
            self.param_type.into(),
            NULL_TEXT, // concept_id
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEvent {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub icu_stay_id: Option<String>,
    pub item_id: String,
    pub chart_time: DateTime<Utc>,
    pub store_time: Option<DateTime<Utc>>,
    pub cgid: Option<String>,
    pub value: Option<String>,
    pub value_num: Option<f32>,
    pub value_uom: Option<String>,
    pub warning: bool,
    pub error: bool,
}

impl Record for ChartEvent {
    const TABLE: Table = Table::ChartEvents;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            (&self.icu_stay_id).into(),
            (&self.item_id).into(),
            self.chart_time.into(),
            self.store_time.into(),
            (&self.cgid).into(),
            (&self.value).into(),
            self.value_num.into(),
            (&self.value_uom).into(),
            self.warning.into(),
            self.error.into(),
            NULL_TEXT, // result_status
            NULL_TEXT, // stopped
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub chart_date: DateTime<Utc>,
    pub chart_time: Option<DateTime<Utc>>,
    pub category: NoteCategory,
    pub description: String,
    pub cgid: Option<String>,
    pub is_error: bool,
    pub text: Option<String>,
}

impl Record for NoteEvent {
    const TABLE: Table = Table::NoteEvents;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            self.chart_date.into(),
            self.chart_time.into(),
            NULL_TIME, // store_time
            self.category.into(),
            (&self.description).into(),
            (&self.cgid).into(),
            self.is_error.into(),
            (&self.text).into(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrobiologyEvent {
    pub id: String,
    pub subject_id: String,
    pub admission_id: String,
    pub chart_date: DateTime<Utc>,
    pub spec_type_desc: Option<String>,
    pub org_name: Option<String>,
    pub isolate_num: Option<i32>,
    pub ab_name: Option<String>,
    pub interpretation: Option<Interpretation>,
    pub comments: Option<String>,
}

impl Record for MicrobiologyEvent {
    const TABLE: Table = Table::MicrobiologyEvents;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            (&self.id).into(),
            (&self.subject_id).into(),
            (&self.admission_id).into(),
            self.chart_date.into(),
            NULL_TIME, // chart_time
            NULL_TEXT, // spec_item_id
            (&self.spec_type_desc).into(),
            NULL_TEXT, // org_item_id
            (&self.org_name).into(),
            self.isolate_num.into(),
            NULL_TEXT, // ab_item_id
            (&self.ab_name).into(),
            NULL_TEXT, // dilution_text
            NULL_TEXT, // dilution_comparison
            NULL_REAL, // dilution_value
            self.interpretation.into(),
            (&self.comments).into(),
        ]
    }
}

/// Check that an encoded row lines up with its catalog table
pub fn conforms(table: Table, row: &[SqlValue]) -> bool {
    use crate::catalog::ColumnType;

    let columns = table.def().columns;
    columns.len() == row.len()
        && columns.iter().zip(row).all(|(column, value)| {
            let type_ok = matches!(
                (column.ty, value),
                (ColumnType::Text, SqlValue::Text(_))
                    | (ColumnType::Enum(_), SqlValue::Text(_))
                    | (ColumnType::Timestamp, SqlValue::Timestamp(_))
                    | (ColumnType::Boolean, SqlValue::Bool(_))
                    | (ColumnType::Integer, SqlValue::Int(_))
                    | (ColumnType::Real, SqlValue::Real(_))
            );
            let domain_ok = match (column.ty, value) {
                (ColumnType::Enum(domain), SqlValue::Text(Some(text))) => {
                    domain.validate(text).is_ok()
                }
                _ => true,
            };
            type_ok && domain_ok && (column.nullable || !value.is_null())
        })
}
