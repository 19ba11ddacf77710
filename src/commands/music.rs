//! Music command handlers, plus AI song recommendations.

use std::fmt::Write;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{BotError, Result};
use crate::music::AudioEngine;
use crate::providers::ProviderChain;

use super::dispatch::Invocation;
use super::parser::parse_volume;

const RECOMMEND_SYSTEM: &str =
    "You are Mepa, a music curator with dark, expensive taste. You answer with JSON only.";

/// Reply when the recommendation answer is missing or unreadable.
pub const RECOMMEND_FAILURE: &str = "My Spotify is lagging. Look it up yourself. 🙄";

/// One recommended song, as the provider is asked to format it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub reason: String,
}

pub async fn play(inv: &Invocation<'_>, audio: &dyn AudioEngine) -> Result<()> {
    let guild = inv.guild()?;
    let query = inv.command.args.trim();
    if query.is_empty() {
        return Err(BotError::Validation(
            "Play what? Give me a song, like `.play kill bill sza`.".to_string(),
        ));
    }
    let channel = inv
        .message
        .voice_channel
        .ok_or(BotError::NotInVoiceChannel)?;

    let title = audio.play(guild, channel, query).await?;
    inv.reply(&format!("Now playing: **{title}** 🎧")).await?;
    Ok(())
}

pub async fn stop(inv: &Invocation<'_>, audio: &dyn AudioEngine) -> Result<()> {
    let guild = inv.guild()?;
    audio.stop(guild).await?;
    inv.reply("Music's off. Silence suits you. 🤫").await?;
    Ok(())
}

pub async fn skip(inv: &Invocation<'_>, audio: &dyn AudioEngine) -> Result<()> {
    let guild = inv.guild()?;
    audio.skip(guild).await?;
    inv.reply("Skipped. That one was mid anyway. ⏭️").await?;
    Ok(())
}

/// The level is validated before the engine is touched.
pub async fn volume(inv: &Invocation<'_>, audio: &dyn AudioEngine) -> Result<()> {
    let level = parse_volume(&inv.command.args)?;
    let guild = inv.guild()?;
    audio.set_volume(guild, level).await?;
    inv.reply(&format!("Volume set to {level}%. 🔊")).await?;
    Ok(())
}

pub async fn shuffle(inv: &Invocation<'_>, audio: &dyn AudioEngine) -> Result<()> {
    let guild = inv.guild()?;
    let shuffled = audio.shuffle(guild).await?;
    let text = if shuffled == 0 {
        "Nothing queued to shuffle. Add some taste first. 🎶".to_string()
    } else {
        format!("Shuffled {shuffled} tracks. Chaos is a vibe. 🔀")
    };
    inv.reply(&text).await?;
    Ok(())
}

/// `.recommend <vibe>`: three songs from the provider chain.
pub async fn recommend(inv: &Invocation<'_>, chain: &ProviderChain) -> Result<()> {
    let vibe = inv.command.args.trim();
    if vibe.is_empty() {
        return Err(BotError::Validation(
            "Tell me the vibe. e.g., `.recommend dark feminine rap`".to_string(),
        ));
    }

    if let Err(e) = inv.gateway.broadcast_typing(inv.message.channel_id).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }

    let prompt = format!(
        "Generate a JSON list of 3 songs matching vibe \"{vibe}\". \
         Format: [{{\"title\": \"Song\", \"artist\": \"Artist\", \"reason\": \"Why Mepa likes it\"}}]. \
         Return ONLY JSON."
    );
    let songs = match chain.complete(RECOMMEND_SYSTEM, &prompt, &[]).await {
        Some(response) => match parse_recommendations(&response.text) {
            Ok(songs) if !songs.is_empty() => Some(songs),
            Ok(_) => None,
            Err(e) => {
                warn!("Unreadable recommendations from {}: {e}", response.provider);
                None
            }
        },
        None => None,
    };

    let text = songs.map_or_else(
        || RECOMMEND_FAILURE.to_string(),
        |songs| render_recommendations(vibe, &songs),
    );
    inv.reply(&text).await?;
    Ok(())
}

/// Parses the provider's JSON answer, tolerating markdown code fences.
///
/// # Errors
///
/// Returns a JSON error when the text is not an array of songs.
pub fn parse_recommendations(text: &str) -> Result<Vec<Recommendation>> {
    let cleaned = text.replace("```json", "").replace("```", "");
    Ok(serde_json::from_str(cleaned.trim())?)
}

#[must_use]
pub fn render_recommendations(vibe: &str, songs: &[Recommendation]) -> String {
    let mut text = format!("**Mepa's Curated Vibe for \"{vibe}\"** 🎧");
    for song in songs {
        let _ = write!(text, "\n- **{}** by {}", song.title, song.artist);
        if !song.reason.is_empty() {
            let _ = write!(text, ": _{}_", song.reason);
        }
    }
    text
}
