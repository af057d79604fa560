use chrono::{DateTime, Duration, Local, NaiveTime};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::NotificationService;
use attendance_domain::clock::Clock;

/// Pushes the sign-in reminder at fixed local times every day
pub struct ReminderScheduler {
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    pub fn start(
        times: Vec<NaiveTime>,
        notification_service: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!("Reminder scheduler started with {} reminder time(s)", times.len());

        let handle = tokio::spawn(async move {
            loop {
                let now = clock.now();
                let Some(next_run) = next_fire_after(now, &times) else {
                    warn!("No valid reminder time, reminder scheduler exiting");
                    break;
                };

                let wait = (next_run - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::from_secs(60));

                info!(
                    "Next sign-in reminder: {} (in {} seconds)",
                    next_run.format("%Y-%m-%d %H:%M:%S"),
                    wait.as_secs()
                );

                tokio::time::sleep(wait).await;

                if let Err(e) = notification_service.send_sign_in_reminder().await {
                    error!("Sign-in reminder failed: {}", e);
                }
            }
        });

        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
        info!("Reminder scheduler stopped");
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Earliest reminder strictly after `now`, looking at most one day ahead.
///
/// Wall times that do not exist in the local zone on a given day are skipped.
pub fn next_fire_after(now: DateTime<Local>, times: &[NaiveTime]) -> Option<DateTime<Local>> {
    let today = now.date_naive();

    [today, today + Duration::days(1)]
        .iter()
        .flat_map(|day| {
            times
                .iter()
                .filter_map(move |time| day.and_time(*time).and_local_timezone(Local).earliest())
        })
        .filter(|candidate| *candidate > now)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};

    fn local(hour: u32, minute: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn times() -> Vec<NaiveTime> {
        ["08:00", "12:00", "18:00"]
            .iter()
            .map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap())
            .collect()
    }

    #[test]
    fn test_next_fire_later_today() {
        let next = next_fire_after(local(10, 0), &times()).unwrap();
        assert_eq!(next, local(12, 0));
    }

    #[test]
    fn test_exact_time_moves_to_next_slot() {
        let next = next_fire_after(local(12, 0), &times()).unwrap();
        assert_eq!(next, local(18, 0));
    }

    #[test]
    fn test_after_last_slot_rolls_to_tomorrow() {
        let next = next_fire_after(local(19, 30), &times()).unwrap();
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(next.hour(), 8);
    }

    #[test]
    fn test_no_times_never_fires() {
        assert!(next_fire_after(local(10, 0), &[]).is_none());
    }
}
