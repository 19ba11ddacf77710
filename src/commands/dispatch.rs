//! Command dispatch: permission gate, then the handler for the name.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use poise::serenity_prelude::{GuildId, MessageId, Permissions};

use crate::error::{BotError, Result};
use crate::gateway::Gateway;
use crate::music::AudioEngine;
use crate::providers::ProviderChain;
use crate::random::RandomSource;
use crate::store::Store;
use crate::types::{IncomingMessage, UserMention};

use super::parser::{CommandName, ParsedCommand};
use super::{general, moderation, music, roles};

/// Everything a handler needs about the invocation it serves.
pub struct Invocation<'a> {
    pub gateway: &'a dyn Gateway,
    pub message: &'a IncomingMessage,
    pub command: &'a ParsedCommand,
}

impl Invocation<'_> {
    pub fn guild(&self) -> Result<GuildId> {
        self.message.guild_id.ok_or(BotError::NotInServer)
    }

    /// First mentioned non-bot user, or `TargetNotFound`.
    pub fn target(&self) -> Result<&UserMention> {
        self.message
            .first_user_mention()
            .ok_or(BotError::TargetNotFound {
                command: self.command.name,
            })
    }

    pub async fn reply(&self, text: &str) -> Result<MessageId> {
        self.gateway.reply(self.message, text).await
    }

    /// Posts to the invoking channel without a reply reference.
    pub async fn say(&self, text: &str) -> Result<MessageId> {
        self.gateway
            .send_message(self.message.channel_id, text)
            .await
    }
}

/// Fails closed unless the invoker holds the command's capability.
/// Administrators hold every capability.
///
/// # Errors
///
/// Returns `PermissionDenied` when the capability is missing.
pub fn authorize(permissions: Permissions, command: CommandName) -> Result<()> {
    match command.required_permission() {
        Some(required) if !permissions.administrator() && !permissions.contains(required) => {
            Err(BotError::PermissionDenied { command })
        }
        _ => Ok(()),
    }
}

/// Routes parsed commands to their handlers. Handler failures become one
/// in-character reply; nothing propagates to the event loop.
pub struct CommandDispatcher {
    store: Arc<dyn Store>,
    audio: Arc<dyn AudioEngine>,
    random: Arc<dyn RandomSource>,
    chain: Arc<ProviderChain>,
    mute_duration: Duration,
}

impl CommandDispatcher {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        audio: Arc<dyn AudioEngine>,
        random: Arc<dyn RandomSource>,
        chain: Arc<ProviderChain>,
        mute_duration: Duration,
    ) -> Self {
        Self {
            store,
            audio,
            random,
            chain,
            mute_duration,
        }
    }

    pub async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        message: &IncomingMessage,
        command: &ParsedCommand,
    ) {
        info!(
            "Command .{} from {} in channel {}",
            command.name,
            message.author_tag(),
            message.channel_id
        );
        let invocation = Invocation {
            gateway,
            message,
            command,
        };

        if let Err(e) = self.run(&invocation).await {
            match &e {
                BotError::PermissionDenied { .. }
                | BotError::TargetNotFound { .. }
                | BotError::Validation(_) => debug!(".{} refused: {e}", command.name),
                _ => warn!(".{} failed: {e}", command.name),
            }
            if let Err(e) = gateway.reply(message, &e.user_message()).await {
                warn!("Failed to send error reply for .{}: {e}", command.name);
            }
        }
    }

    async fn run(&self, inv: &Invocation<'_>) -> Result<()> {
        authorize(inv.message.permissions, inv.command.name)?;

        let store = self.store.as_ref();
        let audio = self.audio.as_ref();
        match inv.command.name {
            CommandName::Ban => moderation::ban(inv, store).await,
            CommandName::Kick => moderation::kick(inv, store).await,
            CommandName::Mute => moderation::mute(inv, store, self.mute_duration).await,
            CommandName::Softban => moderation::softban(inv, store).await,
            CommandName::Warn => moderation::warn(inv, store).await,
            CommandName::Clear => moderation::clear(inv, store).await,
            CommandName::Role => roles::create(inv, store).await,
            CommandName::Roles => roles::list(inv, store).await,
            CommandName::Delrole => roles::delete(inv, store).await,
            CommandName::Play => music::play(inv, audio).await,
            CommandName::Stop => music::stop(inv, audio).await,
            CommandName::Skip => music::skip(inv, audio).await,
            CommandName::Volume => music::volume(inv, audio).await,
            CommandName::Shuffle => music::shuffle(inv, audio).await,
            CommandName::Recommend => music::recommend(inv, &self.chain).await,
            CommandName::Help => general::help(inv).await,
            CommandName::Vibecheck => general::vibecheck(inv, self.random.as_ref()).await,
            CommandName::Testwelcome => general::test_welcome(inv, store).await,
        }
    }
}
