use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::commands::handlers::SignInGate;
use crate::application::services::{LedgerSyncService, NotificationService};
use crate::presentation::dispatcher::RequestDispatcher;
use attendance_domain::clock::{Clock, SystemClock};
use attendance_domain::ledger::AttendanceLedger;
use attendance_domain::notification::NotificationDisplay;
use attendance_domain::sign_in::SignInStore;
use attendance_infrastructure::config::AgentConfig;
use attendance_infrastructure::http::HttpAttendanceLedger;
use attendance_infrastructure::persistence::repositories::SqliteSignInStore;
use attendance_infrastructure::persistence::Database;

/// Fully wired agent, ready to be spawned
pub struct AgentState {
    pub database: Database,
    pub store: Arc<dyn SignInStore>,
    pub clock: Arc<dyn Clock>,
    pub notification_service: Arc<NotificationService>,
    pub dispatcher: Arc<RequestDispatcher>,
}

pub async fn open_database(config: &AgentConfig) -> Result<Database> {
    info!("Database path: {}", config.database_path.display());

    let started_at = Instant::now();
    let database = Database::new(&config.database_path)
        .await
        .context("Failed to open sign-in database")?;
    database
        .run_migrations()
        .await
        .context("Failed to run migrations")?;
    info!(
        "Database ready ({}ms)",
        started_at.elapsed().as_millis()
    );

    Ok(database)
}

pub async fn build_agent_state(
    config: &AgentConfig,
    display: Arc<dyn NotificationDisplay>,
) -> Result<AgentState> {
    let database = open_database(config).await?;
    let pool = Arc::new(database.pool().clone());

    let store = Arc::new(SqliteSignInStore::new(pool)) as Arc<dyn SignInStore>;
    let clock = Arc::new(SystemClock) as Arc<dyn Clock>;

    let gate = Arc::new(SignInGate::new(
        store.clone(),
        clock.clone(),
        config.sign_in_scope,
    ));
    info!("Sign-in scope: {}", gate.scope());
    let notification_service = Arc::new(NotificationService::new(display));

    let mut dispatcher = RequestDispatcher::new(gate, notification_service.clone());

    if let Some(ledger_config) = &config.ledger {
        let ledger = HttpAttendanceLedger::new(
            &ledger_config.base_url,
            config.timeouts.http_request,
        )?;
        info!("Ledger sync enabled: {}", ledger.endpoint());

        let ledger = Arc::new(ledger) as Arc<dyn AttendanceLedger>;
        dispatcher = dispatcher.with_ledger_sync(Arc::new(LedgerSyncService::new(
            ledger,
            ledger_config.user_id.clone(),
        )));
    } else {
        info!("Ledger sync disabled");
    }

    Ok(AgentState {
        database,
        store,
        clock,
        notification_service,
        dispatcher: Arc::new(dispatcher),
    })
}
