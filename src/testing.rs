//! Test doubles for the capability traits.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, Permissions, RoleId, UserId};

use crate::error::{BotError, Result};
use crate::gateway::Gateway;
use crate::music::AudioEngine;
use crate::providers::{CompletionProvider, CompletionRequest, VisionProvider};
use crate::types::{ImageInput, IncomingMessage, UserMention, WelcomeCard};

pub const CHANNEL: ChannelId = ChannelId::new(200);
pub const GUILD: GuildId = GuildId::new(300);
pub const AUTHOR: UserId = UserId::new(400);
pub const TARGET: UserId = UserId::new(500);

/// A guild message from an unprivileged member named BrokeBoy.
pub fn message(content: &str) -> IncomingMessage {
    IncomingMessage {
        id: MessageId::new(100),
        channel_id: CHANNEL,
        guild_id: Some(GUILD),
        guild_name: Some("Inner Circle".to_string()),
        author_id: AUTHOR,
        username: "brokeboy".to_string(),
        display_name: "BrokeBoy".to_string(),
        author_is_bot: false,
        role_names: Vec::new(),
        permissions: Permissions::empty(),
        content: content.to_string(),
        mentions_bot: false,
        mentions: Vec::new(),
        role_mentions: Vec::new(),
        avatar_url: "https://cdn.discordapp.com/avatars/400/a.png".to_string(),
        voice_channel: None,
    }
}

/// Same as [`message`], with `permissions` granted and `Target` mentioned.
pub fn moderator_message(content: &str, permissions: Permissions) -> IncomingMessage {
    let mut msg = message(content);
    msg.permissions = permissions;
    msg.mentions.push(UserMention {
        id: TARGET,
        name: "Target".to_string(),
        bot: false,
    });
    msg
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// One recorded gateway side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send { channel: ChannelId, text: String },
    Reply { text: String },
    Edit { message: MessageId, text: String },
    React { emoji: String },
    Typing,
    Delete { count: u8 },
    DeleteMessage { message: MessageId },
    Timeout { user: UserId, duration: Duration },
    Kick { user: UserId },
    Ban { user: UserId, delete_message_days: u8 },
    Unban { user: UserId },
    Grant { user: UserId, role: RoleId },
    Revoke { user: UserId, role: RoleId },
    Card { channel: ChannelId, card: WelcomeCard },
    FetchImage { url: String },
}

/// Gateway that records every call and succeeds unless told otherwise.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    welcome_channel: Option<ChannelId>,
    fail_next_reply: AtomicBool,
    fail_reactions: bool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_welcome_channel(mut self, channel: ChannelId) -> Self {
        self.welcome_channel = Some(channel);
        self
    }

    /// Makes the first reply fail, as if Discord rejected it.
    pub fn failing_first_reply(self) -> Self {
        self.fail_next_reply.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every reaction fail, as if the emoji were unusable.
    pub fn failing_reactions(mut self) -> Self {
        self.fail_reactions = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| predicate(call)).count()
    }

    /// Text of every reply and plain send, in order.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                Call::Reply { text } | Call::Send { text, .. } | Call::Edit { text, .. } => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn reactions(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                Call::React { emoji } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    fn next_message_id(&self) -> MessageId {
        MessageId::new(9000 + self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId> {
        self.record(Call::Send {
            channel,
            text: text.to_string(),
        });
        Ok(self.next_message_id())
    }

    async fn reply(&self, _to: &IncomingMessage, text: &str) -> Result<MessageId> {
        if self.fail_next_reply.swap(false, Ordering::SeqCst) {
            return Err(BotError::Validation("reply rejected".to_string()));
        }
        self.record(Call::Reply {
            text: text.to_string(),
        });
        Ok(self.next_message_id())
    }

    async fn edit_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
        text: &str,
    ) -> Result<()> {
        self.record(Call::Edit {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn react(&self, _channel: ChannelId, _message: MessageId, emoji: &str) -> Result<()> {
        if self.fail_reactions {
            return Err(BotError::Validation(format!("`{emoji}` rejected")));
        }
        self.record(Call::React {
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn broadcast_typing(&self, _channel: ChannelId) -> Result<()> {
        self.record(Call::Typing);
        Ok(())
    }

    async fn delete_recent_messages(&self, _channel: ChannelId, count: u8) -> Result<usize> {
        self.record(Call::Delete { count });
        Ok(usize::from(count))
    }

    async fn delete_message(&self, _channel: ChannelId, message: MessageId) -> Result<()> {
        self.record(Call::DeleteMessage { message });
        Ok(())
    }

    async fn timeout_member(
        &self,
        _guild: GuildId,
        user: UserId,
        duration: Duration,
        _reason: &str,
    ) -> Result<()> {
        self.record(Call::Timeout { user, duration });
        Ok(())
    }

    async fn kick_member(&self, _guild: GuildId, user: UserId, _reason: &str) -> Result<()> {
        self.record(Call::Kick { user });
        Ok(())
    }

    async fn ban_member(
        &self,
        _guild: GuildId,
        user: UserId,
        delete_message_days: u8,
        _reason: &str,
    ) -> Result<()> {
        self.record(Call::Ban {
            user,
            delete_message_days,
        });
        Ok(())
    }

    async fn unban_member(&self, _guild: GuildId, user: UserId) -> Result<()> {
        self.record(Call::Unban { user });
        Ok(())
    }

    async fn grant_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        self.record(Call::Grant { user, role });
        Ok(())
    }

    async fn revoke_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        self.record(Call::Revoke { user, role });
        Ok(())
    }

    async fn find_channel(&self, _guild: GuildId, _fragments: &[&str]) -> Option<ChannelId> {
        self.welcome_channel
    }

    async fn send_card(&self, channel: ChannelId, card: &WelcomeCard) -> Result<()> {
        self.record(Call::Card {
            channel,
            card: card.clone(),
        });
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<ImageInput> {
        self.record(Call::FetchImage {
            url: url.to_string(),
        });
        Ok(ImageInput {
            mime_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        })
    }
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail,
    Hang,
}

/// Completion provider with a canned outcome.
pub struct ScriptedProvider {
    name: &'static str,
    script: Script,
    calls: AtomicUsize,
    last: Mutex<Option<CompletionRequest>>,
}

impl ScriptedProvider {
    fn build(name: &'static str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name,
            script,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn replying(name: &'static str, text: &str) -> Arc<Self> {
        Self::build(name, Script::Reply(text.to_string()))
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Self::build(name, Script::Fail)
    }

    /// Never answers; only a timeout gets past it.
    pub fn hanging(name: &'static str) -> Arc<Self> {
        Self::build(name, Script::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_history_len(&self) -> Option<usize> {
        lock(&self.last).as_ref().map(|r| r.history.len())
    }

    pub fn last_system(&self) -> Option<String> {
        lock(&self.last).as_ref().map(|r| r.system.clone())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last) = Some(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail => Err(BotError::ProviderResponse {
                provider: self.name,
                message: "scripted failure".to_string(),
            }),
            Script::Hang => {
                std::future::pending::<()>().await;
                Ok(String::new())
            }
        }
    }
}

/// Vision provider with a canned outcome.
pub struct ScriptedVision {
    name: &'static str,
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedVision {
    pub fn replying(name: &'static str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for ScriptedVision {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete_with_image(
        &self,
        _system: &str,
        _prompt: &str,
        _image: &ImageInput,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(BotError::ProviderResponse {
            provider: self.name,
            message: "scripted vision failure".to_string(),
        })
    }
}

/// One recorded audio engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play { channel: ChannelId, query: String },
    Stop,
    Skip,
    Volume(u8),
    Shuffle,
}

/// Audio engine that records calls and optionally fails every one.
#[derive(Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
    failing: bool,
}

impl RecordingAudio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failing: true,
        })
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: AudioCall) -> Result<()> {
        lock(&self.calls).push(call);
        if self.failing {
            Err(BotError::Engine("scripted engine failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AudioEngine for RecordingAudio {
    async fn play(&self, _guild: GuildId, channel: ChannelId, query: &str) -> Result<String> {
        self.record(AudioCall::Play {
            channel,
            query: query.to_string(),
        })?;
        Ok(format!("{query} (Official Audio)"))
    }

    async fn stop(&self, _guild: GuildId) -> Result<()> {
        self.record(AudioCall::Stop)
    }

    async fn skip(&self, _guild: GuildId) -> Result<()> {
        self.record(AudioCall::Skip)
    }

    async fn set_volume(&self, _guild: GuildId, volume: u8) -> Result<()> {
        self.record(AudioCall::Volume(volume))
    }

    async fn shuffle(&self, _guild: GuildId) -> Result<usize> {
        self.record(AudioCall::Shuffle)?;
        Ok(3)
    }
}
