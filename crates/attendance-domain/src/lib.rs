// Domain layer - Pure attendance rules
// No dependencies on infrastructure or the agent host

pub mod clock;
pub mod ledger;
pub mod notification;
pub mod session;
pub mod shared;
pub mod sign_in;

// Re-exports for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use session::{classify_hour, Session};
pub use shared::{DomainError, RequestId};
