use thiserror::Error;

/// Errors raised while describing, generating or checking the synthetic dataset
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid generation config: {0}")]
    InvalidConfig(String),

    #[error("Unknown {domain} value: {value}")]
    UnknownValue { domain: &'static str, value: String },

    #[error("Referential integrity violation: {table}.{column} = {value} has no parent row")]
    Integrity {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Dependency cycle between tables: {0}")]
    Cycle(String),
}
