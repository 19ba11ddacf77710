//! Command-line parsing for prefix commands.

use poise::serenity_prelude::Permissions;
use strum::{Display, EnumIter, EnumString};

use crate::error::{BotError, Result};

use super::COMMAND_PREFIX;

/// Maximum messages `.clear` may delete in one go.
pub const MAX_CLEAR: u8 = 100;
const DEFAULT_CLEAR: u8 = 10;

/// Registered command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandName {
    Ban,
    Kick,
    #[strum(to_string = "mute", serialize = "timeout")]
    Mute,
    Softban,
    Warn,
    Clear,
    Role,
    Roles,
    Delrole,
    Play,
    Stop,
    Skip,
    Volume,
    Shuffle,
    Recommend,
    Help,
    Vibecheck,
    Testwelcome,
}

impl CommandName {
    /// Capability the invoker must hold. `None` means anyone may run it.
    #[must_use]
    pub fn required_permission(self) -> Option<Permissions> {
        match self {
            CommandName::Ban | CommandName::Softban => Some(Permissions::BAN_MEMBERS),
            CommandName::Kick => Some(Permissions::KICK_MEMBERS),
            CommandName::Mute | CommandName::Warn => Some(Permissions::MODERATE_MEMBERS),
            CommandName::Clear => Some(Permissions::MANAGE_MESSAGES),
            CommandName::Role | CommandName::Delrole => Some(Permissions::MANAGE_ROLES),
            _ => None,
        }
    }

    /// One-line usage for `.help`.
    #[must_use]
    pub fn usage(self) -> &'static str {
        match self {
            CommandName::Ban => "`.ban @user [reason]` - gone forever",
            CommandName::Kick => "`.kick @user [reason]` - show them the door",
            CommandName::Mute => "`.mute @user [reason]` - timeout the noise",
            CommandName::Softban => "`.softban @user` - ban, wipe their messages, unban",
            CommandName::Warn => "`.warn @user [reason]` - a public reality check",
            CommandName::Clear => "`.clear [1-100]` - bulk delete recent messages",
            CommandName::Role => "`.role @role emoji` - post a reaction role",
            CommandName::Roles => "`.roles` - list reaction roles",
            CommandName::Delrole => "`.delrole <messageId>` - remove a reaction role",
            CommandName::Play => "`.play <query>` - play music in your voice channel",
            CommandName::Stop => "`.stop` - stop the music",
            CommandName::Skip => "`.skip` - skip the current track",
            CommandName::Volume => "`.volume <1-100>` - set the volume",
            CommandName::Shuffle => "`.shuffle` - shuffle the queue",
            CommandName::Recommend => "`.recommend <vibe>` - curated songs for a mood",
            CommandName::Help => "`.help` - this list",
            CommandName::Vibecheck => "`.vibecheck [@user]` - measure someone's aura",
            CommandName::Testwelcome => "`.testwelcome` - simulate the welcome card",
        }
    }
}

/// A recognised command and its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: CommandName,
    pub args: String,
}

impl ParsedCommand {
    /// Parses `.name args...`. Unregistered names yield `None` so the
    /// message can still reach the responder.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(COMMAND_PREFIX)?;
        let (word, args) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        let name = word.parse::<CommandName>().ok()?;
        Some(Self {
            name,
            args: args.trim().to_string(),
        })
    }

    /// Argument text with user/role mention tokens removed.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        let reason = self
            .args
            .split_whitespace()
            .filter(|token| !(token.starts_with("<@") && token.ends_with('>')))
            .collect::<Vec<_>>()
            .join(" ");
        (!reason.is_empty()).then_some(reason)
    }
}

/// Parses the `.clear` amount, defaulting to 10.
///
/// # Errors
///
/// Returns `Validation` when the amount is not a number or outside `1..=100`.
pub fn parse_clear_amount(args: &str) -> Result<u8> {
    let Some(raw) = args.split_whitespace().next() else {
        return Ok(DEFAULT_CLEAR);
    };
    let amount: u64 = raw.parse().map_err(|_| {
        BotError::Validation(format!("`{raw}` isn't a number. Try `.clear 20`."))
    })?;
    match u8::try_from(amount) {
        Ok(amount) if (1..=MAX_CLEAR).contains(&amount) => Ok(amount),
        _ => Err(BotError::Validation(format!(
            "I can only clear between 1 and {MAX_CLEAR} messages at a time."
        ))),
    }
}

/// Parses a `.volume` level.
///
/// # Errors
///
/// Returns `Validation` when missing, not a number, or outside `1..=100`.
pub fn parse_volume(args: &str) -> Result<u8> {
    let raw = args
        .split_whitespace()
        .next()
        .ok_or_else(|| BotError::Validation("Volume to what? Give me 1-100.".to_string()))?;
    let level: i64 = raw
        .parse()
        .map_err(|_| BotError::Validation(format!("`{raw}` isn't a volume. Give me 1-100.")))?;
    match u8::try_from(level) {
        Ok(level) if (1..=100).contains(&level) => Ok(level),
        _ => Err(BotError::Validation(
            "Volume goes from 1 to 100. I'm not blowing out anyone's ears.".to_string(),
        )),
    }
}
