use reqwest::StatusCode;
use thiserror::Error;

use crate::commands::CommandName;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invoker lacks the capability required by .{command}")]
    PermissionDenied { command: CommandName },

    #[error("No target resolved for .{command}")]
    TargetNotFound { command: CommandName },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{provider} API error ({status}): {message}")]
    ProviderApi {
        provider: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("{provider} response error: {message}")]
    ProviderResponse {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} timed out after {seconds}s")]
    ProviderTimeout {
        provider: &'static str,
        seconds: u64,
    },

    #[error("Audio engine error: {0}")]
    Engine(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("This command only works in a server")]
    NotInServer,

    #[error("User is not in a voice channel")]
    NotInVoiceChannel,
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns an in-character reply suitable for displaying in Discord.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::PermissionDenied { command } => permission_refusal(*command).to_string(),
            BotError::TargetNotFound { command } => missing_target(*command).to_string(),
            BotError::Validation(reason) => format!("{reason} 🙄"),
            BotError::Serenity(_) => {
                "Discord is being dramatic right now. Try again in a sec. 🥀".to_string()
            }
            BotError::Config(_) | BotError::EnvVar(_) => {
                "Someone misconfigured me. Tell the admins to get it together. 🕯️".to_string()
            }
            BotError::ProviderApi { status, .. } => match *status {
                StatusCode::TOO_MANY_REQUESTS => {
                    "I'm being rate limited. Even queens need a breather. 💅".to_string()
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "My brain's keys are revoked. Admins, fix it. 🔮".to_string()
                }
                _ => "The universe is blocking this connection. Probably because your frequency is too low. 🔮".to_string(),
            },
            BotError::ProviderResponse { .. }
            | BotError::ProviderTimeout { .. }
            | BotError::Reqwest(_)
            | BotError::Json(_)
            | BotError::Url(_) => {
                "The universe is blocking this connection. Probably because your frequency is too low. 🔮".to_string()
            }
            BotError::Engine(_) => {
                "The aux cord snapped. That's your fault somehow. 🎧".to_string()
            }
            BotError::Persistence(_) => {
                "My diary is locked right now. Try again later. 📓".to_string()
            }
            BotError::NotInServer => "This only works in a server, bestie. 🖤".to_string(),
            BotError::NotInVoiceChannel => {
                "Get in a voice channel first. I'm not singing to the void. 🎤".to_string()
            }
        }
    }
}

fn permission_refusal(command: CommandName) -> &'static str {
    match command {
        CommandName::Clear => "You don't have the aura to delete messages. Sit down. 💅",
        CommandName::Kick => "Nice try, but you're not an admin. 💅",
        CommandName::Ban | CommandName::Softban => {
            "You can't ban people. That's *my* job (and admins')."
        }
        CommandName::Mute => "You can't silence anyone. Your voice doesn't carry that far. 🤫",
        CommandName::Warn => "Warnings come from staff, not from you. 🐍",
        CommandName::Role | CommandName::Delrole => {
            "Role management is for the inner circle. You're not in it. 🥂"
        }
        _ => "You don't have the clearance for that. 💅",
    }
}

fn missing_target(command: CommandName) -> &'static str {
    match command {
        CommandName::Kick => "Who are we kicking? Tag them.",
        CommandName::Ban | CommandName::Softban => "Tag the dusty you want to ban.",
        CommandName::Mute => "Who needs silencing? Tag them. 🤐",
        CommandName::Warn => "Warn who, exactly? Tag them.",
        CommandName::Role => "Mention a role and an emoji, like `.role @Role 💖`.",
        CommandName::Delrole => "I don't have a reaction role on that message. 🙄",
        _ => "I couldn't find who you meant. Tag them properly.",
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_and_missing_target_replies_differ() {
        let denied = BotError::PermissionDenied {
            command: CommandName::Ban,
        };
        let missing = BotError::TargetNotFound {
            command: CommandName::Ban,
        };
        assert_ne!(denied.user_message(), missing.user_message());
    }

    #[test]
    fn rate_limit_gets_its_own_reply() {
        let err = BotError::ProviderApi {
            provider: "groq",
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "slow down".to_string(),
        };
        assert!(err.user_message().contains("rate limited"));
    }

    #[test]
    fn replies_never_leak_raw_errors() {
        let err = BotError::Persistence("relation \"logs\" does not exist".to_string());
        assert!(!err.user_message().contains("relation"));
    }
}
