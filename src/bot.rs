//! Discord bot core logic and event handling.

use std::error::Error as StdError;
use std::sync::Arc;

use log::{debug, info, warn};
use poise::{
    Framework, FrameworkOptions,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};
use reqwest::Client;
use songbird::{SerenityInit, Songbird};

use crate::chatbot::{AiResponder, ConversationMemory};
use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::discord::{SerenityGateway, incoming_message, member_join, reaction_event};
use crate::error::Result;
use crate::intent::IntentClassifier;
use crate::music::{AudioEngine, SongbirdEngine};
use crate::providers::{
    GeminiProvider, OpenAiCompatProvider, ProviderChain, Seeding, VisionProvider,
};
use crate::random::{RandomSource, ThreadRandom};
use crate::reaction_roles::ReactionChange;
use crate::router::Router;
use crate::store::{MemoryStore, Store, SupabaseStore};

type EventResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

struct Data {
    router: Router,
    http_client: Client,
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let voice = Songbird::serenity();
    let router = build_router(&config, voice.clone())?;
    let discord_token = config.discord_token.clone();

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord as {}", ready.user.name);
                Ok(Data {
                    router,
                    http_client: Client::new(),
                })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(discord_token, intents)
        .framework(framework)
        .register_songbird_with(voice)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

/// Assembles the providers, store and engine selected by `config`.
fn build_router(config: &Config, voice: Arc<Songbird>) -> Result<Router> {
    let behavior = &config.behavior;

    let mut chain = ProviderChain::new(behavior.provider_timeout);
    if let Some(nvidia) = &config.nvidia {
        chain = chain.with(
            Arc::new(OpenAiCompatProvider::nvidia(nvidia)),
            Seeding::Stateless,
        );
    }
    if let Some(groq) = &config.groq {
        chain = chain.with(Arc::new(OpenAiCompatProvider::groq(groq)), Seeding::Stateless);
    }
    let mut vision: Option<Arc<dyn VisionProvider>> = None;
    if let Some(gemini) = &config.gemini {
        let gemini = Arc::new(GeminiProvider::new(gemini));
        chain = chain.with(gemini.clone(), Seeding::Session);
        vision = Some(gemini);
    }
    if chain.is_empty() {
        warn!("No AI provider configured; every AI reply will be the placeholder");
    } else {
        info!("Provider chain: {}", chain.provider_names().join(" -> "));
    }
    let chain = Arc::new(chain);

    let store: Arc<dyn Store> = match &config.supabase {
        Some(supabase) => {
            info!("Persisting to Supabase");
            Arc::new(SupabaseStore::new(supabase)?)
        }
        None => {
            warn!("Supabase not configured; reaction roles and logs live in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let audio: Arc<dyn AudioEngine> = Arc::new(SongbirdEngine::new(voice));
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
    let memory = Arc::new(ConversationMemory::new(behavior.memory_capacity));

    let responder = AiResponder::new(
        &behavior.system_prompt,
        chain.clone(),
        vision,
        memory,
        behavior.provider_timeout,
    );
    let commands = CommandDispatcher::new(
        store.clone(),
        audio.clone(),
        random.clone(),
        chain,
        behavior.mute_duration(),
    );

    Ok(Router::new(
        IntentClassifier::new(behavior),
        random,
        responder,
        commands,
        audio,
        store,
    ))
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    let gateway = SerenityGateway::new(ctx, data.http_client.clone());

    match event {
        FullEvent::Message { new_message } => {
            if new_message.author.id == ctx.cache.current_user().id {
                return Ok(());
            }
            let message = incoming_message(ctx, new_message);
            debug!(
                "Received message from {} in channel {}",
                message.author_tag(),
                message.channel_id
            );
            data.router.handle_message(&gateway, &message).await;
        }
        FullEvent::ReactionAdd { add_reaction } => {
            if let Some(reaction) = reaction_event(ctx, add_reaction) {
                data.router
                    .handle_reaction(&gateway, &reaction, ReactionChange::Added)
                    .await;
            }
        }
        FullEvent::ReactionRemove { removed_reaction } => {
            if let Some(reaction) = reaction_event(ctx, removed_reaction) {
                data.router
                    .handle_reaction(&gateway, &reaction, ReactionChange::Removed)
                    .await;
            }
        }
        FullEvent::GuildMemberAddition { new_member } => {
            let join = member_join(ctx, new_member);
            data.router.handle_member_join(&gateway, &join).await;
        }
        _ => {}
    }
    Ok(())
}
