// Background agent hosting the session-gated sign-in engine

pub mod application;
pub mod presentation;
