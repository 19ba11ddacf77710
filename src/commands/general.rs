//! Informational commands: help, vibe checks and the welcome simulation.

use strum::IntoEnumIterator;

use crate::error::{BotError, Result};
use crate::random::RandomSource;
use crate::store::Store;
use crate::types::MemberJoin;
use crate::welcome::welcome_member;

use super::dispatch::Invocation;
use super::parser::CommandName;

pub async fn help(inv: &Invocation<'_>) -> Result<()> {
    let mut text = String::from("**Mepa's Commands** 🖤");
    for name in CommandName::iter() {
        text.push('\n');
        text.push_str(name.usage());
    }
    text.push_str("\n\nOr just say my name. I'm always listening. 🔮");
    inv.reply(&text).await?;
    Ok(())
}

/// Maps a uniform draw in `[0, 1)` to a score in `0..=100`.
#[must_use]
pub fn vibe_score(draw: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = (draw.clamp(0.0, 1.0) * 101.0).floor() as u8;
    score.min(100)
}

#[must_use]
pub fn vibe_verdict(score: u8) -> &'static str {
    match score {
        0..=20 => "Negative aura. Please log off. 🥀",
        21..=50 => "Mid. Painfully mid. 😐",
        51..=80 => "Respectable. You may stay. 🖤",
        _ => "Immaculate. Main character energy. 👑",
    }
}

/// `.vibecheck [@user]`: scores the mentioned user, or the invoker.
pub async fn vibecheck(inv: &Invocation<'_>, random: &dyn RandomSource) -> Result<()> {
    let subject = inv
        .message
        .first_user_mention()
        .map_or(inv.message.display_name.as_str(), |m| m.name.as_str());
    let score = vibe_score(random.roll());

    inv.reply(&format!(
        "🔮 **Vibe check for {subject}:** {score}/100\n{}",
        vibe_verdict(score)
    ))
    .await?;
    Ok(())
}

/// `.testwelcome`: runs the member-join flow for the invoker.
pub async fn test_welcome(inv: &Invocation<'_>, store: &dyn Store) -> Result<()> {
    let guild = inv.guild()?;
    let join = MemberJoin {
        guild_id: guild,
        guild_name: inv
            .message
            .guild_name
            .clone()
            .unwrap_or_else(|| "the server".to_string()),
        user_id: inv.message.author_id,
        username: inv.message.username.clone(),
        avatar_url: inv.message.avatar_url.clone(),
    };

    match welcome_member(inv.gateway, store, &join).await? {
        Some(_) => {
            inv.reply("Simulating welcome event... check the welcome channel. 🎀")
                .await?;
            Ok(())
        }
        None => Err(BotError::Validation(
            "There's no welcome, general or chat channel here. Where am I supposed to greet people?"
                .to_string(),
        )),
    }
}
