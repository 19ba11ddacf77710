pub mod bot;
pub mod chatbot;
pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod music;
pub mod providers;
pub mod random;
pub mod reaction_roles;
pub mod router;
pub mod store;
pub mod types;
pub mod welcome;

#[cfg(test)]
pub(crate) mod testing;

pub use bot::run;
