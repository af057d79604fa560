mod display;

pub use display::{NotificationDisplay, NotificationMessage, APP_TITLE};
