//! Text normalization and word/phrase matching.

/// Lowercases, strips everything but letters, digits and whitespace, and
/// collapses runs of whitespace.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when `phrase` occurs in `normalized` on word boundaries.
///
/// Both sides must already be normalized.
pub fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    if phrase.is_empty() || normalized.is_empty() {
        return false;
    }
    format!(" {normalized} ").contains(&format!(" {phrase} "))
}

/// Keywords shorter than this must match a whole word.
const MIN_PREFIX_CHARS: usize = 4;

/// True when a word in `normalized` starts with `keyword`, so inflections
/// ("boyfriends", "loved") count. Short keywords ("ex", "men") only match
/// whole words.
pub fn contains_word_prefix(normalized: &str, keyword: &str) -> bool {
    if keyword.chars().count() < MIN_PREFIX_CHARS {
        return contains_phrase(normalized, keyword);
    }
    normalized.split(' ').any(|word| word.starts_with(keyword))
}

/// Case-insensitive substring match of any needle in `haystack`.
pub fn contains_any_ci(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| !needle.is_empty() && haystack.contains(needle.as_str()))
}

/// Removes Discord mention tokens (`<@123>`, `<@!123>`, `<@&123>`).
pub fn strip_mentions(input: &str) -> String {
    input
        .split_whitespace()
        .filter(|token| !(token.starts_with("<@") && token.ends_with('>')))
        .collect::<Vec<_>>()
        .join(" ")
}
