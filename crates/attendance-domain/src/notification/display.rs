use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

pub const APP_TITLE: &str = "Ghetto Attendance";

/// Notification shown to the user by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn test_push() -> Self {
        Self::new(APP_TITLE, "This is a test push notification!")
    }

    pub fn sign_in_reminder() -> Self {
        Self::new(APP_TITLE, "Time to sign in for your session!")
    }
}

/// Surface that puts a notification in front of the user
#[async_trait]
pub trait NotificationDisplay: Send + Sync {
    async fn display(&self, message: &NotificationMessage) -> Result<(), DomainError>;
}
