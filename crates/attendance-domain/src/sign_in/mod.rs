mod outcome;
mod record;
mod repository;

pub use outcome::{check_window, Reply, SignInOutcome, PERSISTENCE_FAILURE_MESSAGE};
pub use record::{SignInKey, SignInRecord, SignInScope};
pub use repository::SignInStore;
