//! Persistent store for moderation logs and reaction-role bindings.

mod memory;
mod supabase;

use async_trait::async_trait;
use log::{info, warn};
use poise::serenity_prelude::MessageId;

use crate::error::Result;
use crate::types::{LogRecord, ReactionRoleBinding};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Simple CRUD over the external store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_log(&self, record: &LogRecord) -> Result<()>;

    async fn list_reaction_roles(&self) -> Result<Vec<ReactionRoleBinding>>;

    /// Inserts a binding, replacing any existing one for the same
    /// (message, emoji) pair.
    async fn insert_reaction_role(&self, binding: &ReactionRoleBinding) -> Result<()>;

    /// Removes every binding on `message_id` and returns how many went.
    async fn delete_reaction_role(&self, message_id: MessageId) -> Result<usize>;
}

/// Emits the record to the log and persists it best-effort.
pub async fn log_action(store: &dyn Store, record: LogRecord) {
    info!(
        "[LOG] {}: {} - {} (by {})",
        record.action, record.subject, record.context, record.actor
    );
    if let Err(e) = store.insert_log(&record).await {
        warn!("Failed to persist log record '{}': {e}", record.action);
    }
}
