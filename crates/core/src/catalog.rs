//! Schema/entity catalog
//!
//! The catalog is the single description of the relational schema: every
//! table, its ordered columns, its foreign keys and its indexes. DDL
//! rendering, record encoding, integrity checks and the tiered bulk loader
//! all walk it instead of relying on declaration order.

use std::collections::BTreeSet;

use crate::domain::Domain;
use crate::error::CoreError;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Timestamp,
    Boolean,
    Integer,
    Real,
    Enum(Domain),
}

/// A single column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Parent table whose primary key this column references
    pub references: Option<Table>,
}

impl Column {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            primary_key: false,
            references: None,
        }
    }

    const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    const fn primary_key(mut self) -> Self {
        self.nullable = false;
        self.primary_key = true;
        self
    }

    const fn references(mut self, parent: Table) -> Self {
        self.references = Some(parent);
        self
    }
}

const fn text(name: &'static str) -> Column {
    Column::new(name, ColumnType::Text)
}

const fn timestamp(name: &'static str) -> Column {
    Column::new(name, ColumnType::Timestamp)
}

const fn boolean(name: &'static str) -> Column {
    Column::new(name, ColumnType::Boolean)
}

const fn integer(name: &'static str) -> Column {
    Column::new(name, ColumnType::Integer)
}

const fn real(name: &'static str) -> Column {
    Column::new(name, ColumnType::Real)
}

const fn enumerated(name: &'static str, domain: Domain) -> Column {
    Column::new(name, ColumnType::Enum(domain))
}

/// Secondary index on a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub column: &'static str,
}

const fn index(name: &'static str, column: &'static str) -> Index {
    Index { name, column }
}

/// Full definition of a table
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indexes: &'static [Index],
}

impl TableDef {
    pub fn primary_key(&self) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Every table of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Patients,
    Admissions,
    IcuStays,
    Transfers,
    IcdDiagnosisCodes,
    DiagnosesIcd,
    IcdProcedureCodes,
    ProceduresIcd,
    Prescriptions,
    LabItems,
    LabEvents,
    ChartItems,
    ChartEvents,
    InputEvents,
    OutputEvents,
    NoteEvents,
    MicrobiologyEvents,
}

impl Table {
    pub const ALL: [Table; 17] = [
        Table::Patients,
        Table::Admissions,
        Table::IcuStays,
        Table::Transfers,
        Table::IcdDiagnosisCodes,
        Table::DiagnosesIcd,
        Table::IcdProcedureCodes,
        Table::ProceduresIcd,
        Table::Prescriptions,
        Table::LabItems,
        Table::LabEvents,
        Table::ChartItems,
        Table::ChartEvents,
        Table::InputEvents,
        Table::OutputEvents,
        Table::NoteEvents,
        Table::MicrobiologyEvents,
    ];

    pub fn name(self) -> &'static str {
        self.def().name
    }

    /// Static catalogs loaded once before any patient data
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            Table::IcdDiagnosisCodes
                | Table::IcdProcedureCodes
                | Table::LabItems
                | Table::ChartItems
        )
    }

    pub fn def(self) -> &'static TableDef {
        match self {
            Table::Patients => &PATIENTS,
            Table::Admissions => &ADMISSIONS,
            Table::IcuStays => &ICU_STAYS,
            Table::Transfers => &TRANSFERS,
            Table::IcdDiagnosisCodes => &D_ICD_DIAGNOSES,
            Table::DiagnosesIcd => &DIAGNOSES_ICD,
            Table::IcdProcedureCodes => &D_ICD_PROCEDURES,
            Table::ProceduresIcd => &PROCEDURES_ICD,
            Table::Prescriptions => &PRESCRIPTIONS,
            Table::LabItems => &D_LABITEMS,
            Table::LabEvents => &LABEVENTS,
            Table::ChartItems => &D_ITEMS,
            Table::ChartEvents => &CHARTEVENTS,
            Table::InputEvents => &INPUTEVENTS,
            Table::OutputEvents => &OUTPUTEVENTS,
            Table::NoteEvents => &NOTEEVENTS,
            Table::MicrobiologyEvents => &MICROBIOLOGYEVENTS,
        }
    }
}

/// Distinct parent tables referenced by `table`'s foreign keys
pub fn parents(table: Table) -> Vec<Table> {
    let parents: BTreeSet<Table> = table
        .def()
        .columns
        .iter()
        .filter_map(|c| c.references)
        .filter(|parent| *parent != table)
        .collect();
    parents.into_iter().collect()
}

/// Group `tables` into dependency tiers.
///
/// Tier 0 holds the tables with no parent among `tables`; every later tier
/// holds the tables whose parents among `tables` all sit in earlier tiers.
/// Parents outside `tables` are treated as already loaded. Within a tier the
/// tables share no foreign key and can be written concurrently.
pub fn load_tiers(tables: &[Table]) -> Result<Vec<Vec<Table>>, CoreError> {
    let mut pending: BTreeSet<Table> = tables.iter().copied().collect();
    let mut placed: BTreeSet<Table> = BTreeSet::new();
    let mut tiers = Vec::new();

    while !pending.is_empty() {
        let tier: Vec<Table> = pending
            .iter()
            .copied()
            .filter(|table| {
                parents(*table)
                    .iter()
                    .all(|parent| placed.contains(parent) || !pending.contains(parent))
            })
            .collect();

        if tier.is_empty() {
            let names: Vec<&str> = pending.iter().map(|t| t.name()).collect();
            return Err(CoreError::Cycle(names.join(", ")));
        }

        for table in &tier {
            pending.remove(table);
            placed.insert(*table);
        }
        tiers.push(tier);
    }

    Ok(tiers)
}

static PATIENTS: TableDef = TableDef {
    name: "patients",
    columns: &[
        text("subject_id").primary_key(),
        enumerated("gender", Domain::Gender).required(),
        timestamp("date_of_birth").required(),
        timestamp("date_of_death"),
        boolean("expire_flag").required(),
    ],
    indexes: &[
        index("patient_gender_idx", "gender"),
        index("patient_dob_idx", "date_of_birth"),
    ],
};

static ADMISSIONS: TableDef = TableDef {
    name: "admissions",
    columns: &[
        text("admission_id").primary_key(),
        text("subject_id").required().references(Table::Patients),
        timestamp("admit_time").required(),
        timestamp("discharge_time"),
        timestamp("death_time"),
        enumerated("admission_type", Domain::AdmissionType).required(),
        text("admission_location").required(),
        text("discharge_location"),
        enumerated("insurance", Domain::InsuranceType).required(),
        text("language").required(),
        text("religion"),
        enumerated("marital_status", Domain::MaritalStatus).required(),
        text("ethnicity").required(),
        timestamp("ed_reg_time"),
        timestamp("ed_out_time"),
        text("diagnosis"),
        boolean("hospital_expire_flag").required(),
        boolean("has_chartevents_data").required(),
    ],
    indexes: &[
        index("admission_subject_id_idx", "subject_id"),
        index("admission_admit_time_idx", "admit_time"),
        index("admission_type_idx", "admission_type"),
        index("admission_insurance_idx", "insurance"),
    ],
};

static ICU_STAYS: TableDef = TableDef {
    name: "icustays",
    columns: &[
        text("icustay_id").primary_key(),
        text("subject_id").required().references(Table::Patients),
        text("admission_id").required().references(Table::Admissions),
        enumerated("care_unit", Domain::CareUnit).required(),
        timestamp("in_time").required(),
        timestamp("out_time"),
        real("length_of_stay"),
    ],
    indexes: &[
        index("icustay_subject_id_idx", "subject_id"),
        index("icustay_admission_id_idx", "admission_id"),
        index("icustay_care_unit_idx", "care_unit"),
        index("icustay_in_time_idx", "in_time"),
    ],
};

static TRANSFERS: TableDef = TableDef {
    name: "transfers",
    columns: &[
        text("transfer_id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        enumerated("event_type", Domain::TransferEventType).required(),
        text("care_unit"),
        text("ward_id"),
        timestamp("in_time").required(),
        timestamp("out_time"),
        real("length_of_stay"),
    ],
    indexes: &[
        index("transfer_subject_id_idx", "subject_id"),
        index("transfer_admission_id_idx", "admission_id"),
        index("transfer_event_type_idx", "event_type"),
        index("transfer_in_time_idx", "in_time"),
    ],
};

static D_ICD_DIAGNOSES: TableDef = TableDef {
    name: "d_icd_diagnoses",
    columns: &[
        text("icd9_code").primary_key(),
        text("short_title").required(),
        text("long_title").required(),
    ],
    indexes: &[],
};

static DIAGNOSES_ICD: TableDef = TableDef {
    name: "diagnoses_icd",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        integer("seq_num").required(),
        text("icd9_code")
            .required()
            .references(Table::IcdDiagnosisCodes),
    ],
    indexes: &[
        index("diagnoses_icd_subject_id_idx", "subject_id"),
        index("diagnoses_icd_admission_id_idx", "admission_id"),
        index("diagnoses_icd_icd9_code_idx", "icd9_code"),
        index("diagnoses_icd_seq_num_idx", "seq_num"),
    ],
};

static D_ICD_PROCEDURES: TableDef = TableDef {
    name: "d_icd_procedures",
    columns: &[
        text("icd9_code").primary_key(),
        text("short_title").required(),
        text("long_title").required(),
    ],
    indexes: &[],
};

static PROCEDURES_ICD: TableDef = TableDef {
    name: "procedures_icd",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        integer("seq_num").required(),
        text("icd9_code")
            .required()
            .references(Table::IcdProcedureCodes),
    ],
    indexes: &[
        index("procedures_icd_subject_id_idx", "subject_id"),
        index("procedures_icd_admission_id_idx", "admission_id"),
        index("procedures_icd_icd9_code_idx", "icd9_code"),
        index("procedures_icd_seq_num_idx", "seq_num"),
    ],
};

static PRESCRIPTIONS: TableDef = TableDef {
    name: "prescriptions",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        text("icustay_id"),
        timestamp("start_date").required(),
        timestamp("end_date").required(),
        text("drug").required(),
        text("drug_name_poe"),
        text("drug_name_generic"),
        text("formulary_drug_cd"),
        text("gsn"),
        text("ndc"),
        text("prod_strength"),
        text("dose_val_rx"),
        text("dose_unit_rx"),
        text("form_val_disp"),
        text("form_unit_disp"),
        text("route"),
    ],
    indexes: &[
        index("prescriptions_subject_id_idx", "subject_id"),
        index("prescriptions_admission_id_idx", "admission_id"),
        index("prescriptions_drug_idx", "drug"),
        index("prescriptions_start_date_idx", "start_date"),
    ],
};

static D_LABITEMS: TableDef = TableDef {
    name: "d_labitems",
    columns: &[
        text("item_id").primary_key(),
        text("label").required(),
        text("fluid").required(),
        text("category").required(),
        text("loinc_code"),
    ],
    indexes: &[
        index("d_labitems_category_idx", "category"),
        index("d_labitems_fluid_idx", "fluid"),
    ],
};

static LABEVENTS: TableDef = TableDef {
    name: "labevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        text("item_id").required().references(Table::LabItems),
        timestamp("chart_time").required(),
        text("value"),
        real("value_num"),
        text("value_uom"),
        enumerated("flag", Domain::LabFlag),
    ],
    indexes: &[
        index("labevents_subject_id_idx", "subject_id"),
        index("labevents_admission_id_idx", "admission_id"),
        index("labevents_item_id_idx", "item_id"),
        index("labevents_chart_time_idx", "chart_time"),
        index("labevents_flag_idx", "flag"),
    ],
};

static D_ITEMS: TableDef = TableDef {
    name: "d_items",
    columns: &[
        text("item_id").primary_key(),
        text("label").required(),
        text("abbreviation"),
        enumerated("dbsource", Domain::DataSource).required(),
        text("linksto"),
        text("category").required(),
        text("unitname"),
        enumerated("param_type", Domain::ParamType).required(),
        text("concept_id"),
    ],
    indexes: &[
        index("d_items_category_idx", "category"),
        index("d_items_dbsource_idx", "dbsource"),
        index("d_items_param_type_idx", "param_type"),
    ],
};

static CHARTEVENTS: TableDef = TableDef {
    name: "chartevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        text("icustay_id").references(Table::IcuStays),
        text("item_id").required().references(Table::ChartItems),
        timestamp("chart_time").required(),
        timestamp("store_time"),
        text("cgid"),
        text("value"),
        real("value_num"),
        text("value_uom"),
        boolean("warning"),
        boolean("error"),
        text("result_status"),
        text("stopped"),
    ],
    indexes: &[
        index("chartevents_subject_id_idx", "subject_id"),
        index("chartevents_admission_id_idx", "admission_id"),
        index("chartevents_icustay_id_idx", "icustay_id"),
        index("chartevents_item_id_idx", "item_id"),
        index("chartevents_chart_time_idx", "chart_time"),
    ],
};

static INPUTEVENTS: TableDef = TableDef {
    name: "inputevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required(),
        text("icustay_id").required().references(Table::IcuStays),
        timestamp("start_time").required(),
        timestamp("end_time").required(),
        text("item_id").required(),
        real("amount"),
        text("amount_uom"),
        real("rate"),
        text("rate_uom"),
        text("orderid"),
        text("linkorderid"),
        text("order_category_name"),
        text("secondary_order_category_name"),
        text("order_component_type_description"),
        text("order_category_description"),
        real("patient_weight"),
        real("total_amount"),
        text("total_amount_uom"),
        boolean("is_open_bag"),
        boolean("continue_in_next_dept"),
        text("cancel_reason"),
        text("status_description"),
    ],
    indexes: &[
        index("inputevents_subject_id_idx", "subject_id"),
        index("inputevents_admission_id_idx", "admission_id"),
        index("inputevents_icustay_id_idx", "icustay_id"),
        index("inputevents_start_time_idx", "start_time"),
        index("inputevents_item_id_idx", "item_id"),
    ],
};

static OUTPUTEVENTS: TableDef = TableDef {
    name: "outputevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required(),
        text("icustay_id").required().references(Table::IcuStays),
        timestamp("chart_time").required(),
        text("item_id").required(),
        real("value").required(),
        text("value_uom").required(),
    ],
    indexes: &[
        index("outputevents_subject_id_idx", "subject_id"),
        index("outputevents_admission_id_idx", "admission_id"),
        index("outputevents_icustay_id_idx", "icustay_id"),
        index("outputevents_chart_time_idx", "chart_time"),
        index("outputevents_item_id_idx", "item_id"),
    ],
};

static NOTEEVENTS: TableDef = TableDef {
    name: "noteevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        timestamp("chart_date").required(),
        timestamp("chart_time"),
        timestamp("store_time"),
        enumerated("category", Domain::NoteCategory).required(),
        text("description").required(),
        text("cgid"),
        boolean("is_error"),
        text("text"),
    ],
    indexes: &[
        index("noteevents_subject_id_idx", "subject_id"),
        index("noteevents_admission_id_idx", "admission_id"),
        index("noteevents_category_idx", "category"),
        index("noteevents_chart_date_idx", "chart_date"),
    ],
};

static MICROBIOLOGYEVENTS: TableDef = TableDef {
    name: "microbiologyevents",
    columns: &[
        text("id").primary_key(),
        text("subject_id").required(),
        text("admission_id").required().references(Table::Admissions),
        timestamp("chart_date").required(),
        timestamp("chart_time"),
        text("spec_item_id"),
        text("spec_type_desc"),
        text("org_item_id"),
        text("org_name"),
        integer("isolate_num"),
        text("ab_item_id"),
        text("ab_name"),
        text("dilution_text"),
        text("dilution_comparison"),
        real("dilution_value"),
        enumerated("interpretation", Domain::Interpretation),
        text("comments"),
    ],
    indexes: &[
        index("microbiologyevents_subject_id_idx", "subject_id"),
        index("microbiologyevents_admission_id_idx", "admission_id"),
        index("microbiologyevents_chart_date_idx", "chart_date"),
        index("microbiologyevents_org_name_idx", "org_name"),
        index("microbiologyevents_interpretation_idx", "interpretation"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_primary_key() {
        for table in Table::ALL {
            let pk = table.def().primary_key();
            assert!(pk.is_some(), "{} has no primary key", table.name());
            assert!(!pk.unwrap().nullable);
        }
    }

    #[test]
    fn test_table_names_unique() {
        let names: BTreeSet<&str> = Table::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), Table::ALL.len());
    }

    #[test]
    fn test_parents() {
        assert!(parents(Table::Patients).is_empty());
        assert_eq!(parents(Table::Admissions), vec![Table::Patients]);
        assert_eq!(
            parents(Table::ChartEvents),
            vec![Table::Admissions, Table::ChartItems, Table::IcuStays]
        );
        assert_eq!(
            parents(Table::LabEvents),
            vec![Table::Admissions, Table::LabItems]
        );
    }

    #[test]
    fn test_reference_tables_have_no_parents() {
        for table in Table::ALL.iter().filter(|t| t.is_reference()) {
            assert!(parents(*table).is_empty());
        }
    }

    #[test]
    fn test_load_tiers_full_schema() {
        let tiers = load_tiers(&Table::ALL).unwrap();
        assert_eq!(tiers.len(), 4);
        assert!(tiers[0].contains(&Table::Patients));
        assert!(tiers[0].contains(&Table::LabItems));
        assert!(tiers[0].contains(&Table::ChartItems));
        assert_eq!(tiers[1], vec![Table::Admissions]);
        assert!(tiers[2].contains(&Table::IcuStays));
        assert!(tiers[2].contains(&Table::DiagnosesIcd));
        assert!(tiers[3].contains(&Table::ChartEvents));
        assert!(tiers[3].contains(&Table::InputEvents));
        assert!(tiers[3].contains(&Table::OutputEvents));
    }

    #[test]
    fn test_load_tiers_respect_every_edge() {
        let tiers = load_tiers(&Table::ALL).unwrap();
        let tier_of = |t: Table| tiers.iter().position(|tier| tier.contains(&t)).unwrap();
        for table in Table::ALL {
            for parent in parents(table) {
                assert!(tier_of(parent) < tier_of(table));
            }
        }
    }

    #[test]
    fn test_load_tiers_ignore_parents_outside_subset() {
        let tiers = load_tiers(&[Table::LabEvents, Table::Admissions]).unwrap();
        assert_eq!(tiers, vec![vec![Table::Admissions], vec![Table::LabEvents]]);
    }

    #[test]
    fn test_foreign_keys_target_text_primary_keys() {
        for table in Table::ALL {
            for column in table.def().columns {
                if let Some(parent) = column.references {
                    let pk = parent.def().primary_key().unwrap();
                    assert_eq!(pk.ty, column.ty);
                }
            }
        }
    }
}
