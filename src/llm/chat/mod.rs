pub mod gemini;
pub mod openai;
pub mod ollama;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use crate::models::chat::{ ChatMessage, Role };
use self::gemini::GeminiChatClient;
use self::openai::OpenAIChatClient;
use self::ollama::OllamaClient;
use rllm::chat::{ ChatMessage as RllmMessage, ChatRole, MessageType };

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Produces a completion from an ordered conversation context, oldest
    /// turn first.
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;
}

/// Maps our transcript turns onto the provider message shape.
pub fn to_provider_messages(messages: &[ChatMessage]) -> Vec<RllmMessage> {
    messages
        .iter()
        .map(|msg| RllmMessage {
            role: match msg.role {
                Role::User => ChatRole::User,
                Role::Assistant => ChatRole::Assistant,
            },
            content: msg.content.clone(),
            message_type: MessageType::Text,
        })
        .collect()
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn provider_messages_keep_order_and_roles() {
        let turns = vec![
            ChatMessage { role: Role::User, content: "hi".into(), timestamp: 1 },
            ChatMessage { role: Role::Assistant, content: "hello".into(), timestamp: 2 },
            ChatMessage { role: Role::User, content: "bye".into(), timestamp: 3 },
        ];

        let mapped = to_provider_messages(&turns);
        assert_eq!(mapped.len(), 3);
        assert!(matches!(mapped[0].role, ChatRole::User));
        assert!(matches!(mapped[1].role, ChatRole::Assistant));
        assert_eq!(mapped[2].content, "bye");
    }
}
