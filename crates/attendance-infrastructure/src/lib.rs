// Infrastructure layer - Technical implementations
// Depends on domain layer, implements its ports

pub mod config;
pub mod http;
pub mod logging;
pub mod persistence;
