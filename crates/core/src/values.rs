//! Clinical value generators
//!
//! Lab results are drawn from a per-item decision table and classified
//! against that item's reference range. Vital signs come from a similar
//! table of physiologic bounds.

use rand::Rng;

use crate::domain::LabFlag;
use crate::random::{float_between, int_between, pick};

/// Draw range and reference range of a known lab item
#[derive(Debug, Clone, Copy)]
pub struct LabRule {
    pub item_id: &'static str,
    pub min: f64,
    pub max: f64,
    pub decimals: u32,
    pub unit: &'static str,
    /// Values strictly below are LOW
    pub low: f64,
    /// Values strictly above are HIGH
    pub high: f64,
}

impl LabRule {
    pub fn classify(&self, value: f64) -> LabFlag {
        if value > self.high {
            LabFlag::High
        } else if value < self.low {
            LabFlag::Low
        } else {
            LabFlag::Normal
        }
    }
}

pub const LAB_RULES: &[LabRule] = &[
    // Creatinine
    LabRule {
        item_id: "50912",
        min: 0.5,
        max: 3.0,
        decimals: 2,
        unit: "mg/dL",
        low: 0.6,
        high: 1.3,
    },
    // Glucose
    LabRule {
        item_id: "50931",
        min: 70.0,
        max: 400.0,
        decimals: 2,
        unit: "mg/dL",
        low: 70.0,
        high: 140.0,
    },
    // Hematocrit
    LabRule {
        item_id: "51221",
        min: 25.0,
        max: 50.0,
        decimals: 1,
        unit: "%",
        low: 35.0,
        high: 45.0,
    },
];

const GENERIC_LAB_UNITS: &[&str] = &["mg/dL", "mmol/L", "g/dL", "%", "units/L"];

const ABNORMAL_FLAGS: &[LabFlag] = &[
    LabFlag::High,
    LabFlag::Low,
    LabFlag::CriticalHigh,
    LabFlag::CriticalLow,
];

/// Chance that an item without a rule gets an abnormal flag
pub const GENERIC_ABNORMAL_RATE: f64 = 0.2;

pub fn lab_rule(item_id: &str) -> Option<&'static LabRule> {
    LAB_RULES.iter().find(|rule| rule.item_id == item_id)
}

/// A generated lab result
#[derive(Debug, Clone, PartialEq)]
pub struct LabValue {
    pub value_num: f64,
    pub flag: LabFlag,
    pub unit: &'static str,
}

pub fn lab_value<R: Rng + ?Sized>(rng: &mut R, item_id: &str) -> LabValue {
    match lab_rule(item_id) {
        Some(rule) => {
            let value_num = float_between(rng, rule.min, rule.max, rule.decimals);
            LabValue {
                value_num,
                flag: rule.classify(value_num),
                unit: rule.unit,
            }
        }
        None => {
            let value_num = float_between(rng, 10.0, 100.0, 2);
            let flag = if rng.random_bool(GENERIC_ABNORMAL_RATE) {
                *pick(rng, ABNORMAL_FLAGS)
            } else {
                LabFlag::Normal
            };
            LabValue {
                value_num,
                flag,
                unit: *pick(rng, GENERIC_LAB_UNITS),
            }
        }
    }
}

/// Physiologic bounds of a known vital sign
#[derive(Debug, Clone, Copy)]
enum VitalRange {
    Int(u32, u32),
    Float(f64, f64, u32),
}

fn vital_range(item_id: &str) -> VitalRange {
    match item_id {
        "220045" => VitalRange::Int(50, 150),          // heart rate
        "220179" => VitalRange::Int(80, 200),          // systolic BP
        "220180" => VitalRange::Int(40, 120),          // diastolic BP
        "220210" => VitalRange::Int(10, 40),           // respiratory rate
        "223761" => VitalRange::Float(96.0, 104.0, 1), // temperature F
        "220277" => VitalRange::Int(85, 100),          // SpO2
        _ => VitalRange::Float(1.0, 15.0, 0),
    }
}

pub fn vital_value<R: Rng + ?Sized>(rng: &mut R, item_id: &str) -> f64 {
    match vital_range(item_id) {
        VitalRange::Int(min, max) => f64::from(int_between(rng, min, max)),
        VitalRange::Float(min, max, decimals) => float_between(rng, min, max, decimals),
    }
}

/// Text rendering of a drawn value, without float noise
pub fn format_value(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::batch_rng;

    #[test]
    fn test_creatinine_thresholds() {
        let rule = lab_rule("50912").unwrap();
        assert_eq!(rule.classify(1.31), LabFlag::High);
        assert_eq!(rule.classify(0.59), LabFlag::Low);
        assert_eq!(rule.classify(1.3), LabFlag::Normal);
        assert_eq!(rule.classify(0.6), LabFlag::Normal);
        assert_eq!(rule.classify(0.9), LabFlag::Normal);
    }

    #[test]
    fn test_known_items_flag_matches_range() {
        let mut rng = batch_rng(7, 0);
        for rule in LAB_RULES {
            for _ in 0..300 {
                let v = lab_value(&mut rng, rule.item_id);
                assert!(v.value_num >= rule.min && v.value_num <= rule.max);
                assert_eq!(v.flag, rule.classify(v.value_num));
                assert_eq!(v.unit, rule.unit);
            }
        }
    }

    #[test]
    fn test_unknown_item_fallback() {
        let mut rng = batch_rng(8, 0);
        let mut abnormal = 0;
        let draws = 5000;
        for _ in 0..draws {
            let v = lab_value(&mut rng, "50862");
            assert!((10.0..=100.0).contains(&v.value_num));
            assert!(matches!(
                v.flag,
                LabFlag::Normal
                    | LabFlag::High
                    | LabFlag::Low
                    | LabFlag::CriticalHigh
                    | LabFlag::CriticalLow
            ));
            if v.flag != LabFlag::Normal {
                abnormal += 1;
            }
        }
        let rate = abnormal as f64 / draws as f64;
        assert!((0.16..0.24).contains(&rate), "abnormal rate {rate}");
    }

    #[test]
    fn test_vitals_within_bounds() {
        let mut rng = batch_rng(9, 0);
        for _ in 0..500 {
            let hr = vital_value(&mut rng, "220045");
            assert!((50.0..=150.0).contains(&hr));
            assert_eq!(hr.fract(), 0.0);

            let temp = vital_value(&mut rng, "223761");
            assert!((96.0..=104.0).contains(&temp));

            let spo2 = vital_value(&mut rng, "220277");
            assert!((85.0..=100.0).contains(&spo2));

            let gcs = vital_value(&mut rng, "223900");
            assert!((1.0..=15.0).contains(&gcs));
            assert_eq!(gcs.fract(), 0.0);
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.3), "1.3");
        assert_eq!(format_value(120.0), "120");
        assert_eq!(format_value(0.57), "0.57");
    }
}
