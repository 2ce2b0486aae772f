//! Server and seeder configuration

use std::str::FromStr;

use mimic_core::{CoreError, GenerationConfig};
use thiserror::Error;

/// Configuration errors raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error(transparent)]
    Generation(#[from] CoreError),
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn number<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(None),
    }
}

/// HTTP server configuration loaded from environment variables
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
        })
    }
}

/// Seeder configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct SeedSettings {
    pub database_url: String,
    pub generation: GenerationConfig,
    /// Fixed random seed; drawn from the OS when absent
    pub seed: Option<u64>,
}

impl SeedSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            patients: number(&lookup, "SEED_PATIENTS")?.unwrap_or(defaults.patients),
            batch_size: number(&lookup, "SEED_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            ..defaults
        };
        generation.validate()?;

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            generation,
            seed: number(&lookup, "SEED_RANDOM_SEED")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_server_defaults() {
        let config = Config::from_lookup(env(&[("DATABASE_URL", "postgres://localhost/mimic")]))
            .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_database_url_required() {
        let err = Config::from_lookup(env(&[])).err().unwrap();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = SeedSettings::from_lookup(env(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_cors_origins_split() {
        let config = Config::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/mimic"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_seed_settings() {
        let settings = SeedSettings::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/mimic"),
            ("SEED_PATIENTS", "10"),
            ("SEED_BATCH_SIZE", "5"),
            ("SEED_RANDOM_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(settings.generation.patients, 10);
        assert_eq!(settings.generation.batch_size, 5);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(
            settings.generation.admissions_per_patient,
            GenerationConfig::default().admissions_per_patient
        );
    }

    #[test]
    fn test_seed_defaults() {
        let settings =
            SeedSettings::from_lookup(env(&[("DATABASE_URL", "postgres://localhost/mimic")]))
                .unwrap();
        assert_eq!(settings.generation.patients, 1000);
        assert_eq!(settings.generation.batch_size, 50);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = SeedSettings::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/mimic"),
            ("SEED_PATIENTS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                var: "SEED_PATIENTS",
                ..
            }
        ));

        let err = SeedSettings::from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/mimic"),
            ("SEED_BATCH_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Generation(_)));
    }
}
