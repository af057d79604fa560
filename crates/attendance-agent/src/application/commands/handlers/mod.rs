mod sign_in_handler;

#[cfg(test)]
mod tests;

pub use sign_in_handler::SignInGate;
