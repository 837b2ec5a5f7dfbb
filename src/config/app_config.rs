use core::fmt;
use std::env;

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub static CONFIG: Lazy<AppConfig> =
    Lazy::new(|| AppConfig::load().unwrap_or_else(|e| panic!("{}", e)));

#[derive(Serialize, Deserialize, Debug)]
pub enum Runtime {
    Dev,
    Prod,
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Runtime::Dev => write!(f, "development"),
            Runtime::Prod => write!(f, "production"),
        }
    }
}

impl From<String> for Runtime {
    fn from(value: String) -> Self {
        match value.as_str() {
            "DEVELOPMENT" => Runtime::Dev,
            "PRODUCTION" => Runtime::Prod,
            _ => Runtime::Prod,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub practice: PracticeConfig,
    pub database_url: String,
}

fn default_address() -> String {
    "127.0.0.1".into()
}

fn default_port() -> String {
    "3000".into()
}

fn default_idle_timeout() -> u64 {
    7200
}

fn default_non_objective_type_id() -> i64 {
    3
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

/// What to do when the quota promises another question but the store has
/// no qualifying candidate left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Zero the remaining quota and route to the summary.
    #[default]
    EarlyFinish,
    /// Fail the request.
    Fault,
}

/// Whether a submitted question id must be the one most recently served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPolicy {
    #[default]
    Lenient,
    LastServed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Question type reserved for free-text answers, never dispensed.
    #[serde(default = "default_non_objective_type_id")]
    pub non_objective_type_id: i64,
    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,
    #[serde(default)]
    pub submission_policy: SubmissionPolicy,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            non_objective_type_id: default_non_objective_type_id(),
            exhaustion_policy: ExhaustionPolicy::default(),
            submission_policy: SubmissionPolicy::default(),
        }
    }
}

impl AppConfig {
    fn load() -> Result<Self, ConfigError> {
        let runtime: Runtime = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "DEVELOPMENT".into())
            .into();

        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&format!("src/config/{}.toml", runtime)))
            .add_source(Environment::with_prefix("PRACTICE").separator("__"))
            .build()?
            .try_deserialize()?;

        debug!("Loaded config for runtime {}: {:?}", runtime, config.practice);

        Ok(config)
    }
}
