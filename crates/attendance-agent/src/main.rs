use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use attendance_agent::application::services::ReminderScheduler;
use attendance_agent::presentation::bootstrap::{build_agent_state, open_database, AgentState};
use attendance_agent::presentation::stdio::StdioHost;
use attendance_domain::notification::NotificationDisplay;
use attendance_domain::sign_in::SignInStore;
use attendance_infrastructure::config::AgentConfig;
use attendance_infrastructure::logging;
use attendance_infrastructure::persistence::repositories::SqliteSignInStore;

const REQUEST_QUEUE_SIZE: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset = args.iter().any(|arg| arg == "--reset");
    let config_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(AgentConfig::default_path);

    let config = AgentConfig::load_or_init(&config_path)?;

    if let Err(e) = logging::init_logger(&config.log_dir, config.log_level) {
        eprintln!("Failed to initialize file logging: {}", e);
        eprintln!("Falling back to stderr logging only");
        logging::init_stderr_fallback(config.log_level);
    }

    tracing::info!(
        "Attendance agent {} starting (config: {})",
        env!("CARGO_PKG_VERSION"),
        config_path.display()
    );

    if reset {
        let database = open_database(&config).await?;
        let store = SqliteSignInStore::new(Arc::new(database.pool().clone()));
        let removed = store.clear().await?;
        tracing::info!("Cleared {} sign-in record(s)", removed);
        eprintln!("Cleared {} sign-in record(s)", removed);
        database.close().await;
        return Ok(());
    }

    let (host, display) = StdioHost::start(tokio::io::stdout());
    let AgentState {
        database,
        clock,
        notification_service,
        dispatcher,
        ..
    } = build_agent_state(&config, Arc::new(display) as Arc<dyn NotificationDisplay>).await?;

    let scheduler = if config.reminders.enabled {
        Some(ReminderScheduler::start(
            config.reminders.parsed_times()?,
            notification_service,
            clock,
        ))
    } else {
        tracing::info!("Sign-in reminders disabled");
        None
    };

    let (handle, dispatcher_task) =
        dispatcher.spawn(REQUEST_QUEUE_SIZE, config.timeouts.shutdown_grace);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    host.serve(stdin, handle, dispatcher_task).await?;

    if let Some(scheduler) = scheduler {
        scheduler.stop();
    }
    database.close().await;
    tracing::info!("Attendance agent stopped");

    Ok(())
}
