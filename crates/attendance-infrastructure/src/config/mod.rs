mod agent_config;
mod timeouts;

pub use agent_config::{AgentConfig, LedgerConfig, LogLevel, ReminderConfig, APP_DIR_NAME};
pub use timeouts::TimeoutConfig;
