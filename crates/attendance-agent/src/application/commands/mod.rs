pub mod command_handler;
pub mod handlers;
pub mod sign_in_commands;
