//! Derives intent signals from a normalized incoming message.

use log::debug;

use crate::config::BehaviorConfig;
use crate::random::RandomSource;
use crate::types::IncomingMessage;

use super::keywords::{MUSIC_WORDS, ROAST_PHRASES, TOPIC_KEYWORDS, Topic};
use super::matching::{
    contains_any_ci, contains_phrase, contains_word_prefix, normalize, strip_mentions,
};

/// Per-message routing facts. Computed once, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentSignals {
    pub is_direct_call: bool,
    pub is_keyword_trigger: bool,
    pub is_target_list_member: bool,
    pub is_roast_request: bool,
    pub is_music_intent: bool,
    pub is_proactive_match: bool,
    /// Topics behind `is_keyword_trigger`, in keyword-table order.
    pub topics: Vec<Topic>,
}

impl IntentSignals {
    /// True when any signal asks for an AI response.
    #[must_use]
    pub fn wants_response(&self) -> bool {
        self.is_direct_call
            || self.is_keyword_trigger
            || self.is_target_list_member
            || self.is_roast_request
            || self.is_music_intent
            || self.is_proactive_match
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    wake_word: String,
    target_names: Vec<String>,
    proactive_chance: f64,
}

impl IntentClassifier {
    #[must_use]
    pub fn new(behavior: &BehaviorConfig) -> Self {
        Self {
            wake_word: normalize(&behavior.wake_word),
            target_names: behavior
                .target_names
                .iter()
                .map(|name| name.to_lowercase())
                .collect(),
            proactive_chance: behavior.proactive_chance,
        }
    }

    /// Computes the signal set. Only `is_proactive_match` consumes `random`,
    /// and only when no explicit trigger fired.
    pub fn classify(&self, message: &IncomingMessage, random: &dyn RandomSource) -> IntentSignals {
        let text = normalize(&message.content);

        let is_direct_call = message.mentions_bot || contains_phrase(&text, &self.wake_word);

        let mut topics = Vec::new();
        for (keyword, topic) in TOPIC_KEYWORDS {
            if contains_word_prefix(&text, keyword) && !topics.contains(topic) {
                topics.push(*topic);
            }
        }
        let is_keyword_trigger = !topics.is_empty();

        let is_target_list_member = contains_any_ci(&message.username, &self.target_names)
            || contains_any_ci(&message.display_name, &self.target_names);

        let is_roast_request = ROAST_PHRASES
            .iter()
            .any(|phrase| contains_phrase(&text, phrase));

        let is_music_intent = is_direct_call
            && MUSIC_WORDS
                .iter()
                .any(|word| contains_phrase(&text, word));

        let is_proactive_match = !(is_direct_call || is_keyword_trigger || is_music_intent)
            && random.roll() < self.proactive_chance;

        let signals = IntentSignals {
            is_direct_call,
            is_keyword_trigger,
            is_target_list_member,
            is_roast_request,
            is_music_intent,
            is_proactive_match,
            topics,
        };
        debug!("Intent signals for message {}: {signals:?}", message.id);
        signals
    }

    /// Extracts what to play from a natural-language music request: the text
    /// after the first playback word, minus mentions and the wake word.
    #[must_use]
    pub fn music_query(&self, content: &str) -> Option<String> {
        let text = normalize(&strip_mentions(content));
        let tokens: Vec<&str> = text.split_whitespace().collect();

        for start in 0..tokens.len() {
            for word in MUSIC_WORDS {
                let word_tokens: Vec<&str> = word.split_whitespace().collect();
                let end = start + word_tokens.len();
                if end <= tokens.len() && tokens[start..end] == word_tokens[..] {
                    let query = tokens[end..]
                        .iter()
                        .filter(|token| **token != self.wake_word)
                        .copied()
                        .collect::<Vec<_>>()
                        .join(" ");
                    return (!query.is_empty()).then_some(query);
                }
            }
        }
        None
    }
}
