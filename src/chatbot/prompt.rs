//! Context-decorated prompt building.

use std::fmt::Write;

use chrono::Utc;

use crate::intent::IntentSignals;
use crate::types::IncomingMessage;

const FEMININE_ROLE_MARKERS: &[&str] = &["she/her", "girl", "queen", "woman", "baddie", "princess"];
const MASCULINE_ROLE_MARKERS: &[&str] = &["he/him", "boy", "king", "man", "guy", "prince"];

/// Gender coding inferred from role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderCode {
    Feminine,
    Masculine,
}

/// Feminine markers are checked first ("woman" contains "man").
#[must_use]
pub fn gender_from_roles(role_names: &[String]) -> Option<GenderCode> {
    let lowered: Vec<String> = role_names.iter().map(|r| r.to_lowercase()).collect();
    let has = |markers: &[&str]| {
        lowered
            .iter()
            .any(|role| markers.iter().any(|marker| role.contains(marker)))
    };
    if has(FEMININE_ROLE_MARKERS) {
        Some(GenderCode::Feminine)
    } else if has(MASCULINE_ROLE_MARKERS) {
        Some(GenderCode::Masculine)
    } else {
        None
    }
}

/// System instruction plus the user's literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Persona, then overrides in a fixed order: target list, gender coding,
/// topics, roast, music, proactive framing.
#[must_use]
pub fn build_prompt(persona: &str, message: &IncomingMessage, signals: &IntentSignals) -> Prompt {
    let mut system = String::from(persona);

    let timestamp = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let _ = write!(system, "\n\nCurrent datetime: {timestamp}");
    let _ = write!(
        system,
        "\nYou are talking to {} (username: {}).",
        message.display_name, message.username
    );

    if signals.is_target_list_member {
        let _ = write!(
            system,
            "\n\nTARGET ALERT: {} is on your list. Treat them as the ultimate \"mid\". \
             Their aura is shattered and their frequency is low. Give them a brutal reality check \
             and tell them to sit down.",
            message.display_name
        );
    }

    match gender_from_roles(&message.role_names) {
        Some(GenderCode::Feminine) => system.push_str(
            "\n\nThe user carries feminine roles. Be gracious but guarded, you protect the girls.",
        ),
        Some(GenderCode::Masculine) => system.push_str(
            "\n\nThe user carries masculine roles. Your standards are high; humble him instantly if he is rude.",
        ),
        None => {}
    }

    if signals.is_keyword_trigger {
        let topics = signals
            .topics
            .iter()
            .map(|topic| topic.label())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            system,
            "\n\nThey brought up {topics}. You have strong opinions about this, share them."
        );
    }

    if signals.is_roast_request {
        system.push_str(
            "\n\nThey want you to judge their profile picture. Roast it from a high-fashion, \
             gothic, avant-garde perspective.",
        );
    }

    if signals.is_music_intent {
        system.push_str("\n\nThey just asked you to play music. Judge their taste in one line.");
    }

    if signals.is_proactive_match {
        system.push_str(
            "\n\nNobody asked you. You overheard this and are chiming in uninvited. \
             Keep it to one or two sassy lines.",
        );
    }

    Prompt {
        system,
        user: format!("{}: {}", message.display_name, message.content),
    }
}
