mod memory;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use crate::models::chat::{ Conversation, Role };

pub use memory::MemoryHistoryStore;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a turn to the conversation for `conversation_id`, creating
    /// the conversation if it does not exist yet.
    async fn add_message(&self, conversation_id: &str, role: Role, content: &str);

    /// Returns up to the last `limit` turns for `conversation_id`, oldest
    /// first. An unknown id yields an empty conversation.
    async fn get_conversation(&self, conversation_id: &str, limit: usize) -> Conversation;

    /// Drops the conversation for `conversation_id`, if any.
    async fn clear(&self, conversation_id: &str);
}

pub fn initialize_history_store() -> Arc<dyn HistoryStore> {
    info!("Chat history will be kept in process memory (lost on restart)");
    Arc::new(MemoryHistoryStore::new())
}
