//! Serenity adapter: the [`Gateway`] implementation and event conversion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use poise::serenity_prelude::{
    Cache, ChannelId, ChannelType, Context, CreateEmbed, CreateEmbedFooter, CreateMessage,
    EditMember, EditMessage, GetMessages, Guild, GuildId, Http, Member, Message, MessageId,
    Permissions, Reaction, ReactionType, RoleId, Timestamp, UserId,
};
use reqwest::Client;

use crate::error::{BotError, Result};
use crate::gateway::Gateway;
use crate::types::{
    ImageInput, IncomingMessage, MemberJoin, ReactionEvent, RoleMention, UserMention,
    WelcomeCard,
};

/// Discord only bulk-deletes messages younger than two weeks.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;
const DEFAULT_IMAGE_MIME: &str = "image/png";

/// [`Gateway`] backed by the serenity HTTP client and cache.
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
    client: Client,
}

impl SerenityGateway {
    #[must_use]
    pub fn new(ctx: &Context, client: Client) -> Self {
        Self {
            http: ctx.http.clone(),
            cache: ctx.cache.clone(),
            client,
        }
    }

    /// Text channels of `guild` as (id, name), ordered by position.
    async fn text_channels(&self, guild: GuildId) -> Result<Vec<(ChannelId, String)>> {
        let cached = self.cache.guild(guild).map(|guild| {
            let mut channels: Vec<_> = guild
                .channels
                .values()
                .filter(|c| c.kind == ChannelType::Text)
                .map(|c| (c.position, c.id, c.name.clone()))
                .collect();
            channels.sort_unstable_by_key(|(position, ..)| *position);
            channels
        });

        let channels = match cached {
            Some(channels) => channels,
            None => {
                let mut channels: Vec<_> = guild
                    .channels(&self.http)
                    .await?
                    .into_values()
                    .filter(|c| c.kind == ChannelType::Text)
                    .map(|c| (c.position, c.id, c.name))
                    .collect();
                channels.sort_unstable_by_key(|(position, ..)| *position);
                channels
            }
        };
        Ok(channels
            .into_iter()
            .map(|(_, id, name)| (id, name))
            .collect())
    }
}

fn reaction_type(emoji: &str) -> Result<ReactionType> {
    ReactionType::try_from(emoji)
        .map_err(|_| BotError::Validation(format!("`{emoji}` isn't an emoji I can use.")))
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<MessageId> {
        let sent = channel
            .send_message(&self.http, CreateMessage::new().content(text))
            .await?;
        Ok(sent.id)
    }

    async fn reply(&self, to: &IncomingMessage, text: &str) -> Result<MessageId> {
        let message = CreateMessage::new()
            .content(text)
            .reference_message((to.channel_id, to.id));
        let sent = to.channel_id.send_message(&self.http, message).await?;
        Ok(sent.id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        text: &str,
    ) -> Result<()> {
        channel
            .edit_message(&self.http, message, EditMessage::new().content(text))
            .await?;
        Ok(())
    }

    async fn react(&self, channel: ChannelId, message: MessageId, emoji: &str) -> Result<()> {
        channel
            .create_reaction(&self.http, message, reaction_type(emoji)?)
            .await?;
        Ok(())
    }

    async fn broadcast_typing(&self, channel: ChannelId) -> Result<()> {
        channel.broadcast_typing(&self.http).await?;
        Ok(())
    }

    async fn delete_recent_messages(&self, channel: ChannelId, count: u8) -> Result<usize> {
        let cutoff = (Utc::now() - chrono::Duration::days(BULK_DELETE_MAX_AGE_DAYS)).timestamp();
        let ids: Vec<MessageId> = channel
            .messages(&self.http, GetMessages::new().limit(count))
            .await?
            .into_iter()
            .filter(|m| m.timestamp.unix_timestamp() > cutoff)
            .map(|m| m.id)
            .collect();

        match ids.as_slice() {
            [] => {}
            [single] => channel.delete_message(&self.http, *single).await?,
            _ => channel.delete_messages(&self.http, &ids).await?,
        }
        debug!("Deleted {} messages in channel {channel}", ids.len());
        Ok(ids.len())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> Result<()> {
        channel.delete_message(&self.http, message).await?;
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild: GuildId,
        user: UserId,
        duration: Duration,
        reason: &str,
    ) -> Result<()> {
        let duration = chrono::Duration::from_std(duration)
            .map_err(|_| BotError::Validation("That timeout is way too long.".to_string()))?;
        let until = (Utc::now() + duration).to_rfc3339();
        guild
            .edit_member(
                &self.http,
                user,
                EditMember::new()
                    .disable_communication_until(until)
                    .audit_log_reason(reason),
            )
            .await?;
        Ok(())
    }

    async fn kick_member(&self, guild: GuildId, user: UserId, reason: &str) -> Result<()> {
        guild.kick_with_reason(&self.http, user, reason).await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        guild: GuildId,
        user: UserId,
        delete_message_days: u8,
        reason: &str,
    ) -> Result<()> {
        guild
            .ban_with_reason(&self.http, user, delete_message_days, reason)
            .await?;
        Ok(())
    }

    async fn unban_member(&self, guild: GuildId, user: UserId) -> Result<()> {
        guild.unban(&self.http, user).await?;
        Ok(())
    }

    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        self.http
            .add_member_role(guild, user, role, Some("Reaction role"))
            .await?;
        Ok(())
    }

    async fn revoke_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        self.http
            .remove_member_role(guild, user, role, Some("Reaction role"))
            .await?;
        Ok(())
    }

    async fn find_channel(&self, guild: GuildId, fragments: &[&str]) -> Option<ChannelId> {
        let channels = match self.text_channels(guild).await {
            Ok(channels) => channels,
            Err(e) => {
                debug!("Failed to list channels of guild {guild}: {e}");
                return None;
            }
        };
        fragments.iter().find_map(|fragment| {
            channels
                .iter()
                .find(|(_, name)| name.to_lowercase().contains(fragment))
                .map(|(id, _)| *id)
        })
    }

    async fn send_card(&self, channel: ChannelId, card: &WelcomeCard) -> Result<()> {
        let mut embed = CreateEmbed::new()
            .title(&card.title)
            .description(&card.description)
            .thumbnail(&card.thumbnail_url)
            .color(card.color)
            .footer(CreateEmbedFooter::new(&card.footer))
            .timestamp(Timestamp::now());
        for (name, value) in &card.fields {
            embed = embed.field(name, value, true);
        }
        channel
            .send_message(
                &self.http,
                CreateMessage::new().content(&card.greeting).embed(embed),
            )
            .await?;
        Ok(())
    }

    async fn fetch_image(&self, url: &str) -> Result<ImageInput> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        let data = response.bytes().await?.to_vec();
        debug!("Fetched {} bytes of {mime_type} from {url}", data.len());
        Ok(ImageInput { mime_type, data })
    }
}

/// Effective guild permissions: owner and administrators hold everything,
/// everyone else the union of @everyone and their roles.
#[must_use]
pub fn member_permissions(guild: &Guild, user: UserId, roles: &[RoleId]) -> Permissions {
    let everyone = guild
        .roles
        .get(&RoleId::new(guild.id.get()))
        .map_or(Permissions::empty(), |r| r.permissions);
    combine_permissions(
        guild.owner_id == user,
        everyone,
        roles
            .iter()
            .filter_map(|id| guild.roles.get(id))
            .map(|role| role.permissions),
    )
}

fn combine_permissions(
    is_owner: bool,
    everyone: Permissions,
    roles: impl IntoIterator<Item = Permissions>,
) -> Permissions {
    if is_owner {
        return Permissions::all();
    }
    let permissions = roles.into_iter().fold(everyone, |acc, role| acc | role);
    if permissions.administrator() {
        Permissions::all()
    } else {
        permissions
    }
}

/// Guild facts looked up synchronously so no cache guard outlives the call.
#[derive(Default)]
struct GuildFacts {
    guild_name: Option<String>,
    role_names: Vec<String>,
    permissions: Permissions,
    role_mentions: Vec<RoleMention>,
    voice_channel: Option<ChannelId>,
}

fn guild_facts(cache: &Cache, message: &Message, guild_id: GuildId) -> GuildFacts {
    let Some(guild) = cache.guild(guild_id) else {
        return GuildFacts::default();
    };

    let member_roles: Vec<RoleId> = message
        .member
        .as_ref()
        .map(|m| m.roles.clone())
        .or_else(|| guild.members.get(&message.author.id).map(|m| m.roles.clone()))
        .unwrap_or_default();

    GuildFacts {
        guild_name: Some(guild.name.clone()),
        role_names: member_roles
            .iter()
            .filter_map(|id| guild.roles.get(id))
            .map(|r| r.name.clone())
            .collect(),
        permissions: member_permissions(&guild, message.author.id, &member_roles),
        role_mentions: message
            .mention_roles
            .iter()
            .map(|id| RoleMention {
                id: *id,
                name: guild
                    .roles
                    .get(id)
                    .map_or_else(|| id.to_string(), |r| r.name.clone()),
            })
            .collect(),
        voice_channel: guild
            .voice_states
            .get(&message.author.id)
            .and_then(|vs| vs.channel_id),
    }
}

/// Normalizes a serenity message. The bot's own user is dropped from the
/// mention list and reported through `mentions_bot` instead.
#[must_use]
pub fn incoming_message(ctx: &Context, message: &Message) -> IncomingMessage {
    let bot_id = ctx.cache.current_user().id;
    let facts = message
        .guild_id
        .map(|guild_id| guild_facts(&ctx.cache, message, guild_id))
        .unwrap_or_default();

    let display_name = message
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .unwrap_or_else(|| message.author.display_name().to_string());

    IncomingMessage {
        id: message.id,
        channel_id: message.channel_id,
        guild_id: message.guild_id,
        guild_name: facts.guild_name,
        author_id: message.author.id,
        username: message.author.name.clone(),
        display_name,
        author_is_bot: message.author.bot,
        role_names: facts.role_names,
        permissions: facts.permissions,
        content: message.content.clone(),
        mentions_bot: message.mentions_user_id(bot_id),
        mentions: message
            .mentions
            .iter()
            .filter(|u| u.id != bot_id)
            .map(|u| UserMention {
                id: u.id,
                name: u.display_name().to_string(),
                bot: u.bot,
            })
            .collect(),
        role_mentions: facts.role_mentions,
        avatar_url: message.author.face(),
        voice_channel: facts.voice_channel,
    }
}

/// Same key format as the stored bindings: custom emoji id or unicode text.
fn reaction_key(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Custom { id, .. } => id.to_string(),
        ReactionType::Unicode(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `None` when Discord did not say who reacted.
#[must_use]
pub fn reaction_event(ctx: &Context, reaction: &Reaction) -> Option<ReactionEvent> {
    let user_id = reaction.user_id?;
    let bot_id = ctx.cache.current_user().id;
    let user_is_bot = user_id == bot_id
        || reaction.member.as_ref().is_some_and(|m| m.user.bot)
        || ctx.cache.user(user_id).is_some_and(|u| u.bot);

    Some(ReactionEvent {
        guild_id: reaction.guild_id,
        message_id: reaction.message_id,
        emoji: reaction_key(&reaction.emoji),
        user_id,
        user_is_bot,
    })
}

#[must_use]
pub fn member_join(ctx: &Context, member: &Member) -> MemberJoin {
    let guild_name = ctx
        .cache
        .guild(member.guild_id)
        .map_or_else(|| "the server".to_string(), |g| g.name.clone());
    MemberJoin {
        guild_id: member.guild_id,
        guild_name,
        user_id: member.user.id,
        username: member.user.name.clone(),
        avatar_url: member.user.face(),
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::EmojiId;

    use super::*;

    #[test]
    fn owner_holds_every_permission() {
        assert_eq!(
            combine_permissions(true, Permissions::empty(), []),
            Permissions::all()
        );
    }

    #[test]
    fn roles_add_to_everyone() {
        let permissions = combine_permissions(
            false,
            Permissions::SEND_MESSAGES,
            [Permissions::KICK_MEMBERS, Permissions::MANAGE_MESSAGES],
        );
        assert!(permissions.contains(
            Permissions::SEND_MESSAGES | Permissions::KICK_MEMBERS | Permissions::MANAGE_MESSAGES
        ));
        assert!(!permissions.contains(Permissions::BAN_MEMBERS));
    }

    #[test]
    fn administrator_role_grants_everything() {
        let permissions =
            combine_permissions(false, Permissions::empty(), [Permissions::ADMINISTRATOR]);
        assert_eq!(permissions, Permissions::all());
        assert!(permissions.contains(Permissions::BAN_MEMBERS));
    }

    #[test]
    fn member_without_roles_keeps_everyone_only() {
        assert_eq!(
            combine_permissions(false, Permissions::VIEW_CHANNEL, []),
            Permissions::VIEW_CHANNEL
        );
    }

    #[test]
    fn reaction_keys_match_stored_binding_keys() {
        let custom = ReactionType::Custom {
            animated: false,
            id: EmojiId::new(123),
            name: Some("sparkle".to_string()),
        };
        assert_eq!(reaction_key(&custom), crate::reaction_roles::emoji_key("<:sparkle:123>"));
        assert_eq!(
            reaction_key(&ReactionType::Unicode("💖".to_string())),
            crate::reaction_roles::emoji_key("💖")
        );
    }

    #[test]
    fn unicode_and_custom_emoji_parse_for_reactions() {
        assert!(reaction_type("💖").is_ok());
        assert!(reaction_type("<:sparkle:123>").is_ok());
    }
}
