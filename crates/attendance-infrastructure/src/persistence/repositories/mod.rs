pub mod memory_sign_in_repo;
pub mod sign_in_repo;

pub use memory_sign_in_repo::InMemorySignInStore;
pub use sign_in_repo::SqliteSignInStore;
