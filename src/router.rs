//! Message intent router: one entry point per inbound event.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::chatbot::{AiResponder, handle_ai_route};
use crate::commands::CommandDispatcher;
use crate::gateway::Gateway;
use crate::intent::{IntentClassifier, IntentSignals, Route, resolve};
use crate::music::AudioEngine;
use crate::random::RandomSource;
use crate::reaction_roles::{ReactionChange, handle_reaction};
use crate::store::Store;
use crate::types::{IncomingMessage, MemberJoin, ReactionEvent};
use crate::welcome::welcome_member;

/// Classifies each message, picks one route and runs it. Every failure is
/// handled inside; the caller's event loop never sees an error.
pub struct Router {
    classifier: IntentClassifier,
    random: Arc<dyn RandomSource>,
    responder: AiResponder,
    commands: CommandDispatcher,
    audio: Arc<dyn AudioEngine>,
    store: Arc<dyn Store>,
}

impl Router {
    #[must_use]
    pub fn new(
        classifier: IntentClassifier,
        random: Arc<dyn RandomSource>,
        responder: AiResponder,
        commands: CommandDispatcher,
        audio: Arc<dyn AudioEngine>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            classifier,
            random,
            responder,
            commands,
            audio,
            store,
        }
    }

    /// Bot-authored messages are dropped before classification.
    pub async fn handle_message(&self, gateway: &dyn Gateway, message: &IncomingMessage) {
        if message.author_is_bot {
            return;
        }

        let signals = self.classifier.classify(message, self.random.as_ref());
        match resolve(&message.content, signals) {
            Route::Command(command) => {
                self.commands.dispatch(gateway, message, &command).await;
            }
            Route::Respond(signals) => {
                if signals.is_music_intent {
                    self.queue_requested_music(gateway, message).await;
                }
                handle_ai_route(gateway, &self.responder, message, &signals).await;
            }
            Route::Ignore => debug!("Ignoring message {}", message.id),
        }
    }

    /// Natural-language music request: queues audio alongside the AI reply.
    /// Engine failures are logged and never block the reply.
    async fn queue_requested_music(&self, gateway: &dyn Gateway, message: &IncomingMessage) {
        let Some(query) = self.classifier.music_query(&message.content) else {
            debug!("Music intent without a query in message {}", message.id);
            return;
        };
        let (Some(guild), Some(channel)) = (message.guild_id, message.voice_channel) else {
            debug!(
                "{} asked for '{query}' outside a voice channel",
                message.author_tag()
            );
            return;
        };

        match self.audio.play(guild, channel, &query).await {
            Ok(title) => {
                info!("Queued '{title}' for {}", message.author_tag());
                if let Err(e) = gateway.react(message.channel_id, message.id, "🎶").await {
                    debug!("Failed to react to music request: {e}");
                }
            }
            Err(e) => warn!("Music request '{query}' failed: {e}"),
        }
    }

    pub async fn handle_reaction(
        &self,
        gateway: &dyn Gateway,
        event: &ReactionEvent,
        change: ReactionChange,
    ) {
        if let Err(e) = handle_reaction(gateway, self.store.as_ref(), event, change).await {
            warn!(
                "Reaction role {change:?} failed for message {}: {e}",
                event.message_id
            );
        }
    }

    pub async fn handle_member_join(&self, gateway: &dyn Gateway, join: &MemberJoin) {
        info!("{} joined {}", join.username, join.guild_name);
        if let Err(e) = welcome_member(gateway, self.store.as_ref(), join).await {
            warn!("Could not send welcome message for {}: {e}", join.username);
        }
    }

    /// Signals for `message` without acting on them.
    #[must_use]
    pub fn classify(&self, message: &IncomingMessage) -> IntentSignals {
        self.classifier.classify(message, self.random.as_ref())
    }
}
