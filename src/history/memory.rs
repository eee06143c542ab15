use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{ Mutex, RwLock };
use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation, Role };

/// In-process conversation transcripts. Appends for the same conversation
/// id are serialized by a per-conversation mutex; the outer map lock is
/// held only long enough to fetch or insert the entry, so traffic on
/// different ids never queues behind one sender.
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<String, Arc<Mutex<Vec<ChatMessage>>>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    async fn entry(&self, conversation_id: &str) -> Arc<Mutex<Vec<ChatMessage>>> {
        {
            let map = self.conversations.read().await;
            if let Some(entry) = map.get(conversation_id) {
                return entry.clone();
            }
        }
        let mut map = self.conversations.write().await;
        map.entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn add_message(&self, conversation_id: &str, role: Role, content: &str) {
        let entry = self.entry(conversation_id).await;
        let mut messages = entry.lock().await;
        messages.push(ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
        });
    }

    async fn get_conversation(&self, conversation_id: &str, limit: usize) -> Conversation {
        let entry = {
            let map = self.conversations.read().await;
            map.get(conversation_id).cloned()
        };

        let messages = match entry {
            Some(entry) => {
                let messages = entry.lock().await;
                let skip = messages.len().saturating_sub(limit);
                messages[skip..].to_vec()
            }
            None => Vec::new(),
        };

        Conversation {
            id: conversation_id.to_string(),
            messages,
        }
    }

    async fn clear(&self, conversation_id: &str) {
        let mut map = self.conversations.write().await;
        map.remove(conversation_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn full_history(store: &MemoryHistoryStore, id: &str) -> Vec<(Role, String)> {
        store
            .get_conversation(id, usize::MAX).await
            .messages.into_iter()
            .map(|m| (m.role, m.content))
            .collect()
    }

    #[tokio::test]
    async fn appends_preserve_order() {
        let store = MemoryHistoryStore::new();
        store.add_message("a", Role::User, "first").await;
        store.add_message("a", Role::Assistant, "second").await;
        store.add_message("a", Role::User, "third").await;

        assert_eq!(
            full_history(&store, "a").await,
            vec![
                (Role::User, "first".to_string()),
                (Role::Assistant, "second".to_string()),
                (Role::User, "third".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_id_yields_empty_conversation() {
        let store = MemoryHistoryStore::new();
        let conversation = store.get_conversation("nobody", usize::MAX).await;
        assert_eq!(conversation.id, "nobody");
        assert!(conversation.messages.is_empty());
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let store = MemoryHistoryStore::new();
        store.add_message("a", Role::User, "for a").await;
        store.add_message("b", Role::User, "for b").await;

        assert_eq!(full_history(&store, "a").await, vec![(Role::User, "for a".to_string())]);
        assert_eq!(full_history(&store, "b").await, vec![(Role::User, "for b".to_string())]);
    }

    #[tokio::test]
    async fn limit_returns_most_recent_oldest_first() {
        let store = MemoryHistoryStore::new();
        for i in 0..5 {
            store.add_message("a", Role::User, &format!("msg {}", i)).await;
        }

        let conversation = store.get_conversation("a", 2).await;
        let contents: Vec<&str> = conversation.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn clear_drops_only_that_conversation() {
        let store = MemoryHistoryStore::new();
        store.add_message("a", Role::User, "hi").await;
        store.add_message("b", Role::User, "hello").await;
        store.clear("a").await;

        assert!(full_history(&store, "a").await.is_empty());
        assert_eq!(full_history(&store, "b").await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_to_one_id_are_not_lost() {
        let store = Arc::new(MemoryHistoryStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_message("busy", Role::User, &format!("m{}", i)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(full_history(&store, "busy").await.len(), 32);
    }
}
