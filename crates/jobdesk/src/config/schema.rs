use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            collections: CollectionsConfig::default(),
            submission: SubmissionConfig::default(),
            autocomplete: AutocompleteConfig::default(),
            access: AccessConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Collection names in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "default_jobs")]
    pub jobs: String,
    #[serde(default = "default_customers")]
    pub customers: String,
    #[serde(default = "default_users")]
    pub users: String,
}

fn default_jobs() -> String {
    "jobs".to_string()
}

fn default_customers() -> String {
    "customers".to_string()
}

fn default_users() -> String {
    "users".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            customers: default_customers(),
            users: default_users(),
        }
    }
}

/// What happens when a submitted job ID already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobWritePolicy {
    /// Replace the existing job document.
    #[default]
    Overwrite,
    /// Refuse the submission.
    RejectExisting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default)]
    pub job_write_policy: JobWritePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,
}

fn default_blur_grace_ms() -> u64 {
    150
}

impl AutocompleteConfig {
    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            blur_grace_ms: default_blur_grace_ms(),
        }
    }
}

/// Roles allowed past the redirect guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default = "default_allowed_roles")]
    pub allowed_roles: Vec<String>,
}

fn default_allowed_roles() -> Vec<String> {
    vec![
        "owner".to_string(),
        "coordinator".to_string(),
        "engineer".to_string(),
    ]
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_roles: default_allowed_roles(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file. Falls back to `~/.jobdesk/data/jobdesk.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(crate::db::default_database_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
