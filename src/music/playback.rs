//! Voice channel playback using Songbird.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use poise::serenity_prelude::{ChannelId, GuildId};
use rand::seq::SliceRandom;
use reqwest::Client;
use songbird::input::{Compose, YoutubeDl};
use songbird::{Call, Songbird, driver::Bitrate};
use tokio::sync::Mutex;

use crate::error::{BotError, Result};

use super::AudioEngine;

/// Songbird-backed engine resolving queries through a yt-dlp search.
pub struct SongbirdEngine {
    manager: Arc<Songbird>,
    http: Client,
}

impl SongbirdEngine {
    #[must_use]
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self {
            manager,
            http: Client::new(),
        }
    }

    fn call(&self, guild: GuildId) -> Result<Arc<Mutex<Call>>> {
        self.manager
            .get(guild)
            .ok_or_else(|| BotError::Engine(format!("not connected to voice in guild {guild}")))
    }
}

#[async_trait]
impl AudioEngine for SongbirdEngine {
    async fn play(&self, guild: GuildId, channel: ChannelId, query: &str) -> Result<String> {
        let mut source = YoutubeDl::new_search(self.http.clone(), query.to_string());
        let title = match source.aux_metadata().await {
            Ok(metadata) => metadata.title.unwrap_or_else(|| query.to_string()),
            Err(e) => {
                debug!("No metadata for '{query}': {e}");
                query.to_string()
            }
        };

        let call = self
            .manager
            .join(guild, channel)
            .await
            .map_err(|e| BotError::Engine(format!("failed to join voice channel: {e}")))?;
        let mut handler = call.lock().await;
        handler.set_bitrate(Bitrate::Max);

        let track = handler.enqueue_input(source.into()).await;
        info!(
            "Queued '{title}' in guild {guild} (track {:?}, queue length {})",
            track.uuid(),
            handler.queue().len()
        );
        Ok(title)
    }

    async fn stop(&self, guild: GuildId) -> Result<()> {
        let call = self.call(guild)?;
        call.lock().await.queue().stop();
        self.manager
            .leave(guild)
            .await
            .map_err(|e| BotError::Engine(format!("failed to leave voice channel: {e}")))?;
        info!("Stopped playback and left voice in guild {guild}");
        Ok(())
    }

    async fn skip(&self, guild: GuildId) -> Result<()> {
        let call = self.call(guild)?;
        let handler = call.lock().await;
        if handler.queue().is_empty() {
            return Err(BotError::Engine("nothing is queued".to_string()));
        }
        handler
            .queue()
            .skip()
            .map_err(|e| BotError::Engine(format!("failed to skip: {e}")))
    }

    async fn set_volume(&self, guild: GuildId, volume: u8) -> Result<()> {
        let call = self.call(guild)?;
        let handler = call.lock().await;
        let current = handler
            .queue()
            .current()
            .ok_or_else(|| BotError::Engine("nothing is playing".to_string()))?;
        current
            .set_volume(f32::from(volume) / 100.0)
            .map_err(|e| BotError::Engine(format!("failed to set volume: {e}")))
    }

    async fn shuffle(&self, guild: GuildId) -> Result<usize> {
        let call = self.call(guild)?;
        let handler = call.lock().await;
        let shuffled = handler.queue().modify_queue(|queue| {
            let tracks = queue.make_contiguous();
            // Index 0 is the playing track.
            if let Some(upcoming) = tracks.get_mut(1..) {
                upcoming.shuffle(&mut rand::rng());
                upcoming.len()
            } else {
                0
            }
        });
        debug!("Shuffled {shuffled} upcoming tracks in guild {guild}");
        Ok(shuffled)
    }
}
