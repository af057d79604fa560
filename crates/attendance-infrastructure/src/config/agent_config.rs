use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use attendance_domain::shared::{DomainError, UserId};
use attendance_domain::sign_in::SignInScope;

use super::TimeoutConfig;

pub const APP_DIR_NAME: &str = "attendance-agent";

const CONFIG_FILE_NAME: &str = "config.json";
const DATABASE_FILE_NAME: &str = "attendance.db";

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Local times at which the sign-in reminder is pushed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// `HH:MM`, local time
    pub times: Vec<String>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            times: vec!["08:00".into(), "12:00".into(), "18:00".into()],
        }
    }
}

impl ReminderConfig {
    pub fn parsed_times(&self) -> Result<Vec<NaiveTime>, DomainError> {
        self.times
            .iter()
            .map(|t| {
                NaiveTime::parse_from_str(t, "%H:%M").map_err(|e| {
                    DomainError::Validation(format!("Invalid reminder time '{}': {}", t, e))
                })
            })
            .collect()
    }
}

/// Remote attendance ledger the agent mirrors committed sign-ins to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub base_url: Url,
    pub user_id: UserId,
}

/// Persistent agent configuration, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
    pub sign_in_scope: SignInScope,
    pub reminders: ReminderConfig,
    pub ledger: Option<LedgerConfig>,
    pub timeouts: TimeoutConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            database_path: data_dir.join(DATABASE_FILE_NAME),
            log_dir: data_dir.join("logs"),
            log_level: LogLevel::default(),
            sign_in_scope: SignInScope::default(),
            reminders: ReminderConfig::default(),
            ledger: None,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl AgentConfig {
    /// `<config dir>/attendance-agent/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.reminders.parsed_times()?;

        if let Some(ledger) = &self.ledger {
            if ledger.user_id.as_str().is_empty() {
                return Err(DomainError::Validation(
                    "Ledger user_id cannot be empty".to_string(),
                ));
            }
            if !matches!(ledger.base_url.scheme(), "http" | "https") {
                return Err(DomainError::Validation(format!(
                    "Ledger base_url must be http(s): {}",
                    ledger.base_url
                )));
            }
        }

        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
