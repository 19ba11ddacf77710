//! Voice channel audio playback.

mod playback;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId};

use crate::error::Result;

pub use playback::SongbirdEngine;

/// External audio-playback engine. Decoding and streaming live behind it.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Joins `channel` if needed, queues the best match for `query` and
    /// returns its title.
    async fn play(&self, guild: GuildId, channel: ChannelId, query: &str) -> Result<String>;

    /// Clears the queue and leaves the voice channel.
    async fn stop(&self, guild: GuildId) -> Result<()>;

    async fn skip(&self, guild: GuildId) -> Result<()>;

    /// Sets the volume of the current track, `1..=100`.
    async fn set_volume(&self, guild: GuildId, volume: u8) -> Result<()>;

    /// Shuffles upcoming tracks and returns how many were shuffled.
    async fn shuffle(&self, guild: GuildId) -> Result<usize>;
}
