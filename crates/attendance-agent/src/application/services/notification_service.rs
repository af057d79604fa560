use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

use attendance_domain::notification::{NotificationDisplay, NotificationMessage};

/// Puts fixed agent notifications in front of the user
pub struct NotificationService {
    display: Arc<dyn NotificationDisplay>,
}

impl NotificationService {
    pub fn new(display: Arc<dyn NotificationDisplay>) -> Self {
        Self { display }
    }

    pub async fn send_test_push(&self) -> Result<()> {
        self.show(&NotificationMessage::test_push()).await
    }

    pub async fn send_sign_in_reminder(&self) -> Result<()> {
        self.show(&NotificationMessage::sign_in_reminder()).await
    }

    async fn show(&self, message: &NotificationMessage) -> Result<()> {
        if let Err(e) = self.display.display(message).await {
            error!("Failed to display notification '{}': {}", message.body, e);
            return Err(e.into());
        }
        info!("Displayed notification: {}", message.body);
        Ok(())
    }
}
