//! In-process store used when no database is configured.

use std::collections::VecDeque;

use async_trait::async_trait;
use poise::serenity_prelude::MessageId;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{LogRecord, ReactionRoleBinding};

use super::Store;

/// Log records kept in memory; older ones are dropped first.
pub const LOG_CAPACITY: usize = 500;

/// Volatile store; everything is lost on restart.
#[derive(Debug)]
pub struct MemoryStore {
    logs: RwLock<VecDeque<LogRecord>>,
    log_capacity: usize,
    bindings: RwLock<Vec<ReactionRoleBinding>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_log_capacity(LOG_CAPACITY)
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_capacity(log_capacity: usize) -> Self {
        Self {
            logs: RwLock::new(VecDeque::with_capacity(log_capacity)),
            log_capacity,
            bindings: RwLock::default(),
        }
    }

    /// Retained log records, oldest first.
    pub async fn logs(&self) -> Vec<LogRecord> {
        self.logs.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_log(&self, record: &LogRecord) -> Result<()> {
        let mut logs = self.logs.write().await;
        if self.log_capacity == 0 {
            return Ok(());
        }
        while logs.len() >= self.log_capacity {
            logs.pop_front();
        }
        logs.push_back(record.clone());
        Ok(())
    }

    async fn list_reaction_roles(&self) -> Result<Vec<ReactionRoleBinding>> {
        Ok(self.bindings.read().await.clone())
    }

    async fn insert_reaction_role(&self, binding: &ReactionRoleBinding) -> Result<()> {
        let mut bindings = self.bindings.write().await;
        bindings.retain(|b| !(b.message_id == binding.message_id && b.emoji == binding.emoji));
        bindings.push(binding.clone());
        Ok(())
    }

    async fn delete_reaction_role(&self, message_id: MessageId) -> Result<usize> {
        let mut bindings = self.bindings.write().await;
        let before = bindings.len();
        bindings.retain(|b| b.message_id != message_id);
        Ok(before - bindings.len())
    }
}
