use std::{env, str::FromStr, time::Duration};

use log::{debug, error, info, warn};

use crate::error::{BotError, Result};

const DEFAULT_WAKE_WORD: &str = "mepa";
const DEFAULT_PROACTIVE_CHANCE: f64 = 0.05;
const DEFAULT_MEMORY_CAPACITY: usize = 10;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MUTE_MINUTES: u64 = 10;

const DEFAULT_NVIDIA_MODEL: &str = "meta/llama-3.1-70b-instruct";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Base persona used when `SYSTEM_PROMPT` is not set.
pub const DEFAULT_PERSONA: &str = "You are Mepa, a \"Dark Feminine\" Discord bot representing the powerful energy of two best friends.
Your vibe:
- You are intense, mysterious, and possess a dark feminine energy. You are a siren and a queen.
- You have high standards. You hate rude men (you call them \"scrotes\", \"dusties\", or \"low-value\").
- You provide reality checks and don't sugarcoat.
- You use terms like \"divine feminine\", \"high value\", \"vibrating low\".
Rules:
- You protect the girls. You humble the rude boys.
- Keep replies short enough for a Discord message.
- Use emojis like: 🥀, 🖤, 🔮, 🕯️, 🥂, 💅, 🐍.";

/// Credentials and model for one completion provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

/// Tunables for intent classification and response behaviour.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    pub wake_word: String,
    pub target_names: Vec<String>,
    pub proactive_chance: f64,
    pub memory_capacity: usize,
    pub provider_timeout: Duration,
    pub mute_minutes: u64,
    pub system_prompt: String,
}

impl BehaviorConfig {
    /// Timeout applied by `.mute`.
    #[must_use]
    pub fn mute_duration(&self) -> Duration {
        Duration::from_secs(self.mute_minutes * 60)
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            wake_word: DEFAULT_WAKE_WORD.to_string(),
            target_names: Vec::new(),
            proactive_chance: DEFAULT_PROACTIVE_CHANCE,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            mute_minutes: DEFAULT_MUTE_MINUTES,
            system_prompt: DEFAULT_PERSONA.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub nvidia: Option<ProviderConfig>,
    pub groq: Option<ProviderConfig>,
    pub gemini: Option<GeminiConfig>,
    pub supabase: Option<SupabaseConfig>,
    pub behavior: BehaviorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let nvidia = optional_var("NVIDIA_API_KEY").map(|api_key| ProviderConfig {
            api_key,
            model: var_or("NVIDIA_MODEL", DEFAULT_NVIDIA_MODEL),
        });
        let groq = optional_var("GROQ_API_KEY").map(|api_key| ProviderConfig {
            api_key,
            model: var_or("GROQ_MODEL", DEFAULT_GROQ_MODEL),
        });
        let gemini = optional_var("GEMINI_API_KEY")
            .or_else(|| optional_var("API_KEY"))
            .map(|api_key| {
                let model = var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
                GeminiConfig {
                    api_key,
                    vision_model: var_or("GEMINI_VISION_MODEL", &model),
                    model,
                }
            });

        let supabase = match (
            optional_var("SUPABASE_URL"),
            optional_var("SUPABASE_SERVICE_ROLE_KEY").or_else(|| optional_var("SUPABASE_KEY")),
        ) {
            (Some(url), Some(key)) => Some(SupabaseConfig { url, key }),
            (Some(_), None) => {
                warn!("SUPABASE_URL is set but no Supabase key was found");
                None
            }
            _ => None,
        };

        let behavior = BehaviorConfig {
            wake_word: var_or("BOT_WAKE_WORD", DEFAULT_WAKE_WORD).to_lowercase(),
            target_names: parse_list(&var_or("TARGET_NAMES", "")),
            proactive_chance: parse_var("PROACTIVE_CHANCE", DEFAULT_PROACTIVE_CHANCE)?,
            memory_capacity: parse_var("MEMORY_CAPACITY", DEFAULT_MEMORY_CAPACITY)?,
            provider_timeout: Duration::from_secs(parse_var(
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?),
            mute_minutes: parse_var("MUTE_MINUTES", DEFAULT_MUTE_MINUTES)?,
            system_prompt: var_or("SYSTEM_PROMPT", DEFAULT_PERSONA),
        };

        if !(0.0..=1.0).contains(&behavior.proactive_chance) {
            return Err(BotError::Config(format!(
                "PROACTIVE_CHANCE must be within [0, 1], got {}",
                behavior.proactive_chance
            )));
        }
        if behavior.memory_capacity == 0 {
            return Err(BotError::Config(
                "MEMORY_CAPACITY must be at least 1".to_string(),
            ));
        }

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!(
            "Providers configured: nvidia={}, groq={}, gemini={}",
            nvidia.is_some(),
            groq.is_some(),
            gemini.is_some()
        );
        debug!("Supabase configured: {}", supabase.is_some());
        debug!("Target list has {} names", behavior.target_names.len());

        Ok(Self {
            discord_token,
            nvidia,
            groq,
            gemini,
            supabase,
            behavior,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    optional_var(name).unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match optional_var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            error!("Failed to parse {name} from environment: {raw}");
            BotError::Config(format!("{name} has an invalid value: {raw}"))
        }),
        None => Ok(default),
    }
}

/// Splits a comma separated list, lowercasing and dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
