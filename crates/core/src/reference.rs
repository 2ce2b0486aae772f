//! Static reference catalogs and generator vocabularies
//!
//! The four catalogs are persisted once per run; generation then picks codes
//! and items from the in-memory `ReferenceData` without querying the store.

use crate::catalog::Table;
use crate::domain::{DataSource, ParamType};
use crate::records::{
    ChartItem, DiagnosisCode, IcdCode, LabItem, ProcedureCode, SqlValue, TableSource, encode,
};

/// (code, short title, long title)
const DIAGNOSIS_CODES: &[(&str, &str, &str)] = &[
    ("414.01", "Cor athero native", "Coronary atherosclerosis of native coronary artery"),
    ("038.9", "Septicemia NOS", "Unspecified septicemia"),
    ("410.71", "Subendo infarct, init", "Subendocardial infarction, initial episode of care"),
    ("428.0", "CHF NOS", "Congestive heart failure, unspecified"),
    ("584.9", "Acute kidney failure NOS", "Acute kidney failure, unspecified"),
    ("507.0", "Pneumonia due to food/vomit", "Pneumonitis due to inhalation of food or vomitus"),
    ("785.52", "Septic shock", "Septic shock"),
    ("518.81", "Acute respiratory failure", "Acute respiratory failure"),
    ("995.92", "Severe sepsis", "Severe sepsis"),
    ("276.2", "Acidosis", "Acidosis"),
    ("99.04", "Transfusion packed cells", "Transfusion of packed cells"),
];

const PROCEDURE_CODES: &[(&str, &str, &str)] = &[
    ("96.72", "Circ assist NOS", "Circulatory monitoring"),
    ("96.04", "Insert endotracheal tube", "Insertion of endotracheal tube"),
    ("89.54", "Echocardiography", "Echocardiography"),
    ("38.93", "Venous catheterization", "Venous catheterization, not elsewhere classified"),
    ("96.6", "Enteral infusion nutrients", "Enteral infusion of concentrated nutritional substances"),
    ("93.90", "Respiratory therapy NOS", "Respiratory therapy, not elsewhere classified"),
    ("57.94", "Insert urethral catheter", "Insertion of indwelling urinary catheter"),
];

/// (item id, label, fluid, category, LOINC)
const LAB_ITEMS: &[(&str, &str, &str, &str, &str)] = &[
    ("50861", "Alanine Aminotransferase (ALT)", "Blood", "Chemistry", "1742-6"),
    ("50862", "Albumin", "Blood", "Chemistry", "1751-7"),
    ("50863", "Alkaline Phosphatase", "Blood", "Chemistry", "6768-6"),
    ("50868", "Anion Gap", "Blood", "Chemistry", "1863-0"),
    ("50878", "Asparate Aminotransferase (AST)", "Blood", "Chemistry", "1920-8"),
    ("50882", "Bicarbonate", "Blood", "Blood Gas", "1963-8"),
    ("50885", "Bilirubin, Total", "Blood", "Chemistry", "1975-2"),
    ("50912", "Creatinine", "Blood", "Chemistry", "2160-0"),
    ("50920", "Estimated GFR", "Blood", "Chemistry", "33914-3"),
    ("50931", "Glucose", "Blood", "Chemistry", "2345-7"),
    ("51006", "Urea Nitrogen", "Blood", "Chemistry", "3094-0"),
    ("51144", "Bands", "Blood", "Hematology", "35332-6"),
    ("51146", "Basophils", "Blood", "Hematology", "705-2"),
    ("51200", "Eosinophils", "Blood", "Hematology", "713-8"),
    ("51221", "Hematocrit", "Blood", "Hematology", "4544-3"),
    ("51222", "Hemoglobin", "Blood", "Hematology", "718-7"),
];

/// (item id, label, category, unit)
const CHART_ITEMS: &[(&str, &str, &str, &str)] = &[
    ("220045", "Heart Rate", "Vital Signs", "bpm"),
    ("220179", "Non Invasive Blood Pressure systolic", "Vital Signs", "mmHg"),
    ("220180", "Non Invasive Blood Pressure diastolic", "Vital Signs", "mmHg"),
    ("220210", "Respiratory Rate", "Vital Signs", "insp/min"),
    ("223761", "Temperature Fahrenheit", "Vital Signs", "Deg. F"),
    ("220277", "O2 saturation pulseoxymetry", "Vital Signs", "%"),
    ("223900", "GCS - Verbal Response", "Neurologic", ""),
    ("223901", "GCS - Motor Response", "Neurologic", ""),
    ("220739", "GCS - Eye Opening", "Neurologic", ""),
];

pub const MEDICATIONS: &[&str] = &[
    "Heparin",
    "Insulin - Regular",
    "Potassium Chloride",
    "Furosemide",
    "Metoprolol",
    "Morphine Sulfate",
    "Acetaminophen",
    "Albuterol",
    "Atorvastatin",
    "Lisinopril",
    "Aspirin",
    "Pantoprazole",
    "Warfarin",
    "Levothyroxine",
    "Amlodipine",
    "Metformin",
    "Hydrochlorothiazide",
    "Prednisone",
    "Clopidogrel",
    "Simvastatin",
];

pub const ROUTES: &[&str] = &["IV", "PO", "IM", "SL", "TOP"];

pub const DOSE_UNITS: &[&str] = &["mg", "mcg", "units", "mL"];

pub const MICROORGANISMS: &[&str] = &[
    "STAPHYLOCOCCUS AUREUS",
    "ESCHERICHIA COLI",
    "KLEBSIELLA PNEUMONIAE",
    "PSEUDOMONAS AERUGINOSA",
    "ENTEROCOCCUS FAECALIS",
    "CANDIDA ALBICANS",
    "STREPTOCOCCUS PNEUMONIAE",
    "ACINETOBACTER BAUMANNII",
    "ENTEROBACTER CLOACAE",
];

pub const ANTIBIOTICS: &[&str] = &[
    "VANCOMYCIN",
    "CEFTRIAXONE",
    "PIPERACILLIN/TAZOBACTAM",
    "LEVOFLOXACIN",
    "MEROPENEM",
    "CIPROFLOXACIN",
    "AMPICILLIN",
    "GENTAMICIN",
    "CLINDAMYCIN",
];

pub const SPECIMEN_TYPES: &[&str] = &["BLOOD", "URINE", "SPUTUM", "WOUND", "CSF"];

pub const ADMISSION_LOCATIONS: &[&str] = &[
    "EMERGENCY ROOM ADMIT",
    "PHYSICIAN REFERRAL",
    "TRANSFER FROM HOSP/EXTRAM",
    "CLINIC REFERRAL/PREMATURE",
    "TRANSFER FROM SKILLED NUR",
];

pub const DISCHARGE_LOCATIONS: &[&str] = &[
    "HOME",
    "SKILLED NURSING FACILITY",
    "HOME HEALTH CARE",
    "REHAB/DISTINCT PART HOSP",
    "HOSPICE-HOME",
];

pub const LANGUAGES: &[&str] = &["ENGLISH", "SPANISH", "PORTUGUESE", "CHINESE", "RUSSIAN"];

pub const RELIGIONS: &[&str] = &["CATHOLIC", "PROTESTANT", "JEWISH", "MUSLIM", "BUDDHIST", "NONE"];

pub const ETHNICITIES: &[&str] = &[
    "WHITE",
    "BLACK/AFRICAN AMERICAN",
    "HISPANIC/LATINO",
    "ASIAN",
    "AMERICAN INDIAN/ALASKA NATIVE",
    "OTHER",
    "UNKNOWN",
];

pub const NOTE_DESCRIPTIONS: &[&str] = &["Report", "Progress note", "Consult", "Addendum", "Correction"];

/// In-memory copy of the static catalogs
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub diagnosis_codes: Vec<DiagnosisCode>,
    pub procedure_codes: Vec<ProcedureCode>,
    pub lab_items: Vec<LabItem>,
    pub chart_items: Vec<ChartItem>,
}

fn icd_code(&(code, short, long): &(&str, &str, &str)) -> IcdCode {
    IcdCode {
        icd9_code: code.to_string(),
        short_title: short.to_string(),
        long_title: long.to_string(),
    }
}

impl ReferenceData {
    /// The built-in catalogs
    pub fn standard() -> Self {
        Self {
            diagnosis_codes: DIAGNOSIS_CODES
                .iter()
                .map(|c| DiagnosisCode(icd_code(c)))
                .collect(),
            procedure_codes: PROCEDURE_CODES
                .iter()
                .map(|c| ProcedureCode(icd_code(c)))
                .collect(),
            lab_items: LAB_ITEMS
                .iter()
                .map(|&(id, label, fluid, category, loinc)| LabItem {
                    item_id: id.to_string(),
                    label: label.to_string(),
                    fluid: fluid.to_string(),
                    category: category.to_string(),
                    loinc_code: Some(loinc.to_string()),
                })
                .collect(),
            chart_items: CHART_ITEMS
                .iter()
                .map(|&(id, label, category, unit)| ChartItem {
                    item_id: id.to_string(),
                    label: label.to_string(),
                    dbsource: DataSource::Metavision,
                    linksto: Some("chartevents".to_string()),
                    category: category.to_string(),
                    unitname: (!unit.is_empty()).then(|| unit.to_string()),
                    param_type: ParamType::Numeric,
                })
                .collect(),
        }
    }

    pub fn total_records(&self) -> usize {
        self.diagnosis_codes.len()
            + self.procedure_codes.len()
            + self.lab_items.len()
            + self.chart_items.len()
    }
}

impl TableSource for ReferenceData {
    fn tables(&self) -> Vec<Table> {
        vec![
            Table::IcdDiagnosisCodes,
            Table::IcdProcedureCodes,
            Table::LabItems,
            Table::ChartItems,
        ]
    }

    fn rows(&self, table: Table) -> Vec<Vec<SqlValue>> {
        match table {
            Table::IcdDiagnosisCodes => encode(&self.diagnosis_codes),
            Table::IcdProcedureCodes => encode(&self.procedure_codes),
            Table::LabItems => encode(&self.lab_items),
            Table::ChartItems => encode(&self.chart_items),
            _ => Vec::new(),
        }
    }
}
