mod ledger_sync;
mod notification_service;
mod reminder_scheduler;

pub use ledger_sync::LedgerSyncService;
pub use notification_service::NotificationService;
pub use reminder_scheduler::{next_fire_after, ReminderScheduler};
