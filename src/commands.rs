//! Prefix command surface: parsing, permission gating and handlers.

mod dispatch;
mod general;
mod moderation;
mod music;
mod parser;
mod roles;

pub use dispatch::{CommandDispatcher, authorize};
pub use parser::{CommandName, ParsedCommand, parse_clear_amount, parse_volume};

/// Literal prefix every command starts with.
pub const COMMAND_PREFIX: char = '.';
