//! Bounded per-channel conversation memory.

use std::collections::{HashMap, VecDeque};

use poise::serenity_prelude::ChannelId;
use tokio::sync::Mutex;

use crate::types::Turn;

/// Process-scoped FIFO cache of recent turns per channel. Lost on restart.
///
/// Appends take the map lock for the whole read-modify-write, so rapid
/// messages in one channel cannot drop each other's turns.
#[derive(Debug)]
pub struct ConversationMemory {
    capacity: usize,
    channels: Mutex<HashMap<ChannelId, VecDeque<Turn>>>,
}

impl ConversationMemory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn push(&self, channel: ChannelId, turn: Turn) {
        let mut channels = self.channels.lock().await;
        let turns = channels.entry(channel).or_default();
        Self::append(turns, turn, self.capacity);
    }

    /// Appends a user turn and the reply atomically.
    pub async fn record_exchange(&self, channel: ChannelId, user: &str, reply: &str) {
        let mut channels = self.channels.lock().await;
        let turns = channels.entry(channel).or_default();
        Self::append(turns, Turn::user(user), self.capacity);
        Self::append(turns, Turn::assistant(reply), self.capacity);
    }

    /// Turns for `channel`, oldest first.
    pub async fn history(&self, channel: ChannelId) -> Vec<Turn> {
        self.channels
            .lock()
            .await
            .get(&channel)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn append(turns: &mut VecDeque<Turn>, turn: Turn, capacity: usize) {
        turns.push_back(turn);
        while turns.len() > capacity {
            turns.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_last_ten_in_order() {
        let memory = ConversationMemory::new(10);
        let channel = ChannelId::new(1);
        for i in 0..15 {
            memory.push(channel, Turn::user(format!("turn {i}"))).await;
        }

        let history = memory.history(channel).await;
        let expected: Vec<Turn> = (5..15).map(|i| Turn::user(format!("turn {i}"))).collect();
        assert_eq!(history, expected);
    }

    #[tokio::test]
    async fn eleventh_append_evicts_oldest() {
        let memory = ConversationMemory::new(10);
        let channel = ChannelId::new(1);
        for i in 0..11 {
            memory.push(channel, Turn::user(i.to_string())).await;
        }
        let history = memory.history(channel).await;
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].text, "1");
    }

    #[tokio::test]
    async fn channels_are_independent() {
        let memory = ConversationMemory::new(10);
        memory
            .record_exchange(ChannelId::new(1), "hi", "hello")
            .await;
        assert_eq!(memory.history(ChannelId::new(1)).await.len(), 2);
        assert!(memory.history(ChannelId::new(2)).await.is_empty());
    }

    #[tokio::test]
    async fn exchange_is_user_then_assistant() {
        let memory = ConversationMemory::new(10);
        let channel = ChannelId::new(3);
        memory.record_exchange(channel, "question", "answer").await;
        assert_eq!(
            memory.history(channel).await,
            vec![Turn::user("question"), Turn::assistant("answer")]
        );
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let memory = std::sync::Arc::new(ConversationMemory::new(100));
        let channel = ChannelId::new(9);
        let mut tasks = Vec::new();
        for i in 0..20 {
            let memory = memory.clone();
            tasks.push(tokio::spawn(async move {
                memory.record_exchange(channel, &format!("q{i}"), "a").await;
            }));
        }
        for task in tasks {
            assert!(task.await.is_ok());
        }
        assert_eq!(memory.history(channel).await.len(), 40);
    }
}
