use std::env;
use std::path::PathBuf;

use crate::store::SchemaVersion;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    /// Path of the CSV task file
    pub const TASKS_FILE: &str = "TASKS_FILE";
    /// Layout ("1" or "2") for a task file that doesn't exist yet.
    /// Existing files keep the layout of their header row.
    pub const TASKS_SCHEMA_VERSION: &str = "TASKS_SCHEMA_VERSION";
    /// Optional RON file listing the known users
    pub const TASKS_USERS_FILE: &str = "TASKS_USERS_FILE";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const BIND_ADDRESS: &str = "127.0.0.1";
    pub const DATA_DIR: &str = "data";
    pub const TASKS_FILE_NAME: &str = "tasks.csv";
    pub const SCHEMA_VERSION: u8 = 1;
}

/// Returns the absolute path to the tasks-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it resolves the same way
/// regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Default location of the task file
pub fn default_tasks_file() -> PathBuf {
    backend_dir()
        .join(defaults::DATA_DIR)
        .join(defaults::TASKS_FILE_NAME)
}

/// Parse a schema version number, falling back to the default on bad input
fn parse_schema_version(raw: Option<String>) -> SchemaVersion {
    let Some(raw) = raw else {
        return SchemaVersion::from_number(defaults::SCHEMA_VERSION).unwrap_or_default();
    };
    match raw.trim().parse::<u8>().ok().and_then(SchemaVersion::from_number) {
        Some(v) => v,
        None => {
            log::warn!(
                "{}={:?} is not 1 or 2, using version {}",
                env_vars::TASKS_SCHEMA_VERSION,
                raw,
                defaults::SCHEMA_VERSION
            );
            SchemaVersion::from_number(defaults::SCHEMA_VERSION).unwrap_or_default()
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        Some(p) => p.trim().parse().unwrap_or_else(|_| {
            log::warn!("{}={:?} is not a valid port, using {}", env_vars::PORT, p, defaults::PORT);
            defaults::PORT
        }),
        None => defaults::PORT,
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub tasks_file: PathBuf,
    pub schema_version: SchemaVersion,
    pub users_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var(env_vars::PORT).ok()),
            bind_address: env::var(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|_| defaults::BIND_ADDRESS.to_string()),
            tasks_file: env::var(env_vars::TASKS_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_tasks_file()),
            schema_version: parse_schema_version(env::var(env_vars::TASKS_SCHEMA_VERSION).ok()),
            users_file: env::var(env_vars::TASKS_USERS_FILE)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            bind_address: defaults::BIND_ADDRESS.to_string(),
            tasks_file: default_tasks_file(),
            schema_version: SchemaVersion::default(),
            users_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_version() {
        assert_eq!(parse_schema_version(None), SchemaVersion::V1);
        assert_eq!(parse_schema_version(Some("2".into())), SchemaVersion::V2);
        assert_eq!(parse_schema_version(Some(" 1 ".into())), SchemaVersion::V1);
        assert_eq!(parse_schema_version(Some("7".into())), SchemaVersion::V1);
        assert_eq!(parse_schema_version(Some("two".into())), SchemaVersion::V1);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port(None), defaults::PORT);
        assert_eq!(parse_port(Some("9000".into())), 9000);
        assert_eq!(parse_port(Some("http".into())), defaults::PORT);
    }

    #[test]
    fn test_default_tasks_file_is_under_backend_dir() {
        let path = default_tasks_file();
        assert!(path.starts_with(backend_dir()));
        assert!(path.ends_with("data/tasks.csv"));
    }
}
