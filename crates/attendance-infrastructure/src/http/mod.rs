mod ledger_client;

pub use ledger_client::{attendance_endpoint, HttpAttendanceLedger, RetryConfig};
