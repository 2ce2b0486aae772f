//! mimic-core: MIMIC-III style schema catalog and synthetic data generation
//!
//! This crate describes the clinical schema (tables, columns, enumerated
//! domains and foreign keys) and generates referentially consistent
//! synthetic patients in independent batches. It performs no I/O.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod ids;
pub mod integrity;
pub mod random;
pub mod records;
pub mod reference;
pub mod text;
pub mod values;

pub use catalog::{Column, ColumnType, Table, TableDef, load_tiers, parents};
pub use config::{CountRange, GenerationConfig};
pub use domain::Domain;
pub use error::CoreError;
pub use generator::{Batch, BatchGenerator, plan_batches};
pub use integrity::verify;
pub use random::batch_rng;
pub use records::{Record, SqlValue, TableSource};
pub use reference::ReferenceData;
