//! Closed enumerated domains
//!
//! Every enumerated column in the catalog draws its values from one of these
//! domains. Each domain is stored as a PostgreSQL enum type, so the store
//! rejects anything outside the set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! closed_domain {
    (
        $(#[$meta:meta])*
        $name:ident => $type_name:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// PostgreSQL enum type name
            pub const TYPE_NAME: &'static str = $type_name;

            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownValue {
                        domain: $type_name,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_domain! {
    Gender => "gender" {
        Male => "M",
        Female => "F",
    }
}

closed_domain! {
    AdmissionType => "admission_type" {
        Elective => "ELECTIVE",
        Urgent => "URGENT",
        Newborn => "NEWBORN",
        Emergency => "EMERGENCY",
    }
}

closed_domain! {
    InsuranceType => "insurance_type" {
        Medicare => "MEDICARE",
        Medicaid => "MEDICAID",
        Private => "PRIVATE",
        Government => "GOVERNMENT",
        SelfPay => "SELF_PAY",
    }
}

closed_domain! {
    MaritalStatus => "marital_status" {
        Married => "MARRIED",
        Single => "SINGLE",
        Widowed => "WIDOWED",
        Divorced => "DIVORCED",
        Separated => "SEPARATED",
        Unknown => "UNKNOWN",
    }
}

closed_domain! {
    CareUnit => "care_unit" {
        Micu => "MICU",
        Sicu => "SICU",
        Tsicu => "TSICU",
        Ccu => "CCU",
        Csru => "CSRU",
        Nicu => "NICU",
        Nward => "NWARD",
    }
}

closed_domain! {
    TransferEventType => "transfer_event_type" {
        Admit => "ADMIT",
        Transfer => "TRANSFER",
        Discharge => "DISCHARGE",
    }
}

closed_domain! {
    /// Clinical severity classification of a lab result
    LabFlag => "lab_flag" {
        Normal => "NORMAL",
        Abnormal => "ABNORMAL",
        Delta => "DELTA",
        High => "HIGH",
        Low => "LOW",
        CriticalHigh => "CRITICAL_HIGH",
        CriticalLow => "CRITICAL_LOW",
    }
}

closed_domain! {
    DataSource => "data_source" {
        Carevue => "CAREVUE",
        Metavision => "METAVISION",
    }
}

closed_domain! {
    ParamType => "param_type" {
        Numeric => "NUMERIC",
        Text => "TEXT",
        DateTime => "DATETIME",
    }
}

closed_domain! {
    NoteCategory => "note_category" {
        DischargeSummary => "Discharge summary",
        Nursing => "Nursing",
        NursingOther => "Nursing/other",
        Physician => "Physician",
        Radiology => "Radiology",
        Nutrition => "Nutrition",
        General => "General",
        SocialWork => "Social Work",
        CaseManagement => "Case Management",
        Pharmacy => "Pharmacy",
        Consult => "Consult",
        Respiratory => "Respiratory",
        RehabServices => "Rehab Services",
        Ecg => "ECG",
        Echo => "Echo",
    }
}

closed_domain! {
    /// Antibiotic susceptibility interpretation
    Interpretation => "interpretation" {
        Susceptible => "S",
        Resistant => "R",
        Intermediate => "I",
        Pending => "P",
    }
}

/// Handle on a closed domain, used by the catalog to type enum columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
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
}

impl Domain {
    pub const ALL: [Domain; 11] = [
        Domain::Gender,
        Domain::AdmissionType,
        Domain::InsuranceType,
        Domain::MaritalStatus,
        Domain::CareUnit,
        Domain::TransferEventType,
        Domain::LabFlag,
        Domain::DataSource,
        Domain::ParamType,
        Domain::NoteCategory,
        Domain::Interpretation,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            Domain::Gender => Gender::TYPE_NAME,
            Domain::AdmissionType => AdmissionType::TYPE_NAME,
            Domain::InsuranceType => InsuranceType::TYPE_NAME,
            Domain::MaritalStatus => MaritalStatus::TYPE_NAME,
            Domain::CareUnit => CareUnit::TYPE_NAME,
            Domain::TransferEventType => TransferEventType::TYPE_NAME,
            Domain::LabFlag => LabFlag::TYPE_NAME,
            Domain::DataSource => DataSource::TYPE_NAME,
            Domain::ParamType => ParamType::TYPE_NAME,
            Domain::NoteCategory => NoteCategory::TYPE_NAME,
            Domain::Interpretation => Interpretation::TYPE_NAME,
        }
    }

    pub fn values(self) -> &'static [&'static str] {
        match self {
            Domain::Gender => Gender::VALUES,
            Domain::AdmissionType => AdmissionType::VALUES,
            Domain::InsuranceType => InsuranceType::VALUES,
            Domain::MaritalStatus => MaritalStatus::VALUES,
            Domain::CareUnit => CareUnit::VALUES,
            Domain::TransferEventType => TransferEventType::VALUES,
            Domain::LabFlag => LabFlag::VALUES,
            Domain::DataSource => DataSource::VALUES,
            Domain::ParamType => ParamType::VALUES,
            Domain::NoteCategory => NoteCategory::VALUES,
            Domain::Interpretation => Interpretation::VALUES,
        }
    }

    /// Check that `value` belongs to this domain
    pub fn validate(self, value: &str) -> Result<(), CoreError> {
        if self.values().contains(&value) {
            Ok(())
        } else {
            Err(CoreError::UnknownValue {
                domain: self.type_name(),
                value: value.to_string(),
            })
        }
    }
}
