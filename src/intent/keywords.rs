//! Built-in trigger vocabularies.

/// Topic a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Romance,
    Appearance,
    Money,
    GenderRelations,
}

impl Topic {
    /// Extra reaction the bot adds on top of the default sass.
    #[must_use]
    pub fn reaction(self) -> Option<&'static str> {
        match self {
            Topic::Money => Some("💸"),
            Topic::Romance => Some("💔"),
            Topic::Appearance | Topic::GenderRelations => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::Romance => "love and dating",
            Topic::Appearance => "looks and fashion",
            Topic::Money => "money and the hustle",
            Topic::GenderRelations => "men, women and how they treat each other",
        }
    }
}

/// Topic keywords, matched as word prefixes on normalized text.
pub const TOPIC_KEYWORDS: &[(&str, Topic)] = &[
    ("love", Topic::Romance),
    ("breakup", Topic::Romance),
    ("boyfriend", Topic::Romance),
    ("girlfriend", Topic::Romance),
    ("crush", Topic::Romance),
    ("dating", Topic::Romance),
    ("ex", Topic::Romance),
    ("fashion", Topic::Appearance),
    ("outfit", Topic::Appearance),
    ("pretty", Topic::Appearance),
    ("ugly", Topic::Appearance),
    ("makeup", Topic::Appearance),
    ("money", Topic::Money),
    ("hustle", Topic::Money),
    ("rich", Topic::Money),
    ("broke", Topic::Money),
    ("men", Topic::GenderRelations),
    ("women", Topic::GenderRelations),
    ("feminist", Topic::GenderRelations),
];

/// Self-referential image requests that trigger an avatar roast.
pub const ROAST_PHRASES: &[&str] = &[
    "roast me",
    "rate me",
    "rate my pfp",
    "roast my pfp",
    "rate my avatar",
    "roast my avatar",
    "how do i look",
    "judge me",
];

/// Playback words that turn a direct call into a music request.
pub const MUSIC_WORDS: &[&str] = &["play", "put on", "queue", "blast"];

/// Sass reaction added to every keyword-triggered message.
pub const SASS_REACTION: &str = "💅";
