use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Schema compiled into the binaries; used unless `STAYFEED_SCHEMA` points elsewhere.
pub const BUILTIN_SCHEMA: &str = include_str!("../schema.sql");

pub const DEFAULT_DATABASE_PATH: &str = "database.db";
pub const DEFAULT_SEARCH_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Alternate schema script; `None` means the built-in one.
    pub schema_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_radius: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from(DEFAULT_DATABASE_PATH),
                schema_path: None,
            },
            search: SearchConfig {
                default_radius: DEFAULT_SEARCH_RADIUS,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let default_radius = match env::var("STAYFEED_SEARCH_RADIUS") {
            Ok(raw) => parse_radius(&raw)?,
            Err(_) => defaults.search.default_radius,
        };

        Ok(Self {
            database: DatabaseConfig {
                path: env::var("STAYFEED_DATABASE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.database.path),
                schema_path: env::var("STAYFEED_SCHEMA").ok().map(PathBuf::from),
            },
            search: SearchConfig { default_radius },
        })
    }

    /// Config pointing at an explicit store file, as used by tests and `--database`.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.database.path = path.into();
        config
    }

    /// Returns the schema script text, reading the override file when configured.
    pub fn schema_script(&self) -> AppResult<String> {
        match &self.database.schema_path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Failed to read schema file {}: {}",
                    path.display(),
                    e
                ))
            }),
            None => Ok(BUILTIN_SCHEMA.to_string()),
        }
    }
}

fn parse_radius(raw: &str) -> AppResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(radius) if radius > 0.0 => Ok(radius),
        Ok(radius) => Err(AppError::ConfigurationError(format!(
            "STAYFEED_SEARCH_RADIUS must be positive, got {}",
            radius
        ))),
        Err(e) => Err(AppError::ConfigurationError(format!(
            "STAYFEED_SEARCH_RADIUS must be a number, got {:?}: {}",
            raw, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_defines_every_table() {
        for table in [
            "Users",
            "Listings",
            "Locations",
            "Reservations",
            "Ratings",
            "Accounts",
            "Posts",
            "Follows",
            "Likes",
            "Comments",
        ] {
            assert!(
                BUILTIN_SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
    }

    #[test]
    fn with_database_keeps_other_defaults() {
        let config = Config::with_database("/tmp/x.db");
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));
        assert!(config.database.schema_path.is_none());
        assert_eq!(config.search.default_radius, DEFAULT_SEARCH_RADIUS);
    }

    #[test]
    fn search_radius_must_be_a_positive_number() {
        assert_eq!(parse_radius("5").unwrap(), 5.0);
        assert_eq!(parse_radius(" 2.5 ").unwrap(), 2.5);
        assert!(matches!(parse_radius("abc"), Err(AppError::ConfigurationError(_))));
        assert!(matches!(parse_radius("0"), Err(AppError::ConfigurationError(_))));
        assert!(matches!(parse_radius("-1"), Err(AppError::ConfigurationError(_))));
        assert!(matches!(parse_radius("NaN"), Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn missing_schema_override_is_a_configuration_error() {
        let mut config = Config::default();
        config.database.schema_path = Some(PathBuf::from("/nonexistent/schema.sql"));
        assert!(matches!(
            config.schema_script(),
            Err(AppError::ConfigurationError(_))
        ));
    }
}
