use crate::history::{ initialize_history_store, HistoryStore };
use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::llm::{ parse_llm_type, LlmConfig };
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::models::chat::Role;

use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// The completion provider failed; the user turn that triggered the call
/// stays recorded.
#[derive(Debug, ThisError)]
#[error("completion provider failed: {source}")]
pub struct CompletionProviderError {
    #[source]
    pub source: Box<dyn Error + Send + Sync>,
}

#[derive(Clone)]
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    history_context_limit: usize,
}

impl ChatAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let prompt_config = prompt::load_prompts(args.prompts_path.as_deref())?;
        let chat_client = Self::initialize_chat_client(args, &prompt_config)?;
        let history_store = initialize_history_store();

        Ok(Self {
            chat_client,
            history_store,
            history_context_limit: args.history_context_limit,
        })
    }

    fn initialize_chat_client(
        args: &Args,
        prompt_config: &PromptConfig
    ) -> Result<Arc<dyn ChatClient>, Box<dyn Error + Send + Sync>> {
        let chat_llm_type = parse_llm_type(&args.chat_llm_type)?;
        let chat_api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            base_url: args.chat_base_url.clone(),
            api_key: chat_api_key,
            completion_model: args.chat_model.clone(),
            system_instruction: Some(prompt_config.system_instruction.clone()),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={:?}, BaseURL={:?}",
            args.chat_llm_type,
            chat_config.completion_model.as_deref().unwrap_or("adapter default"),
            chat_config.base_url.as_deref().unwrap_or("adapter default")
        );
        Ok(chat_client)
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        chat_client: Arc<dyn ChatClient>,
        history_store: Arc<dyn HistoryStore>,
        history_context_limit: usize
    ) -> Self {
        Self { chat_client, history_store, history_context_limit }
    }

    /// Turns one inbound user message into one reply, keeping the
    /// conversation transcript as context. The user turn is recorded
    /// before the provider call and is never rolled back.
    pub async fn handle_message(
        &self,
        conversation_id: &str,
        user_text: &str
    ) -> Result<String, CompletionProviderError> {
        self.history_store.add_message(conversation_id, Role::User, user_text).await;

        let conversation = self.history_store
            .get_conversation(conversation_id, self.history_context_limit).await;

        let completion = self.chat_client
            .complete(&conversation.messages).await
            .map_err(|source| {
                warn!("Completion provider error for conversation {}", conversation_id);
                CompletionProviderError { source }
            })?;

        let reply = match completion.response.trim() {
            "" => "ok".to_string(),
            text => text.to_string(),
        };

        self.history_store.add_message(conversation_id, Role::Assistant, &reply).await;
        Ok(reply)
    }

    /// Wipes the transcript for one conversation (the `/reset` command).
    pub async fn reset(&self, conversation_id: &str) {
        self.history_store.clear(conversation_id).await;
    }

    #[cfg(test)]
    pub(crate) fn history_store(&self) -> &Arc<dyn HistoryStore> {
        &self.history_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::llm::chat::{ ChatClient, CompletionResponse };
    use crate::models::chat::ChatMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the context it was called with; replies with a fixed text
    /// or fails, per test.
    struct StubChatClient {
        reply: Option<String>,
        calls: Mutex<Vec<Vec<(Role, String)>>>,
    }

    impl StubChatClient {
        fn replying(text: &str) -> Self {
            Self { reply: Some(text.to_string()), calls: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { reply: None, calls: Mutex::new(Vec::new()) }
        }

        fn contexts(&self) -> Vec<Vec<(Role, String)>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for StubChatClient {
        async fn complete(
            &self,
            messages: &[ChatMessage]
        ) -> Result<CompletionResponse, Box<dyn Error + Send + Sync>> {
            self.calls.lock().unwrap().push(
                messages.iter().map(|m| (m.role, m.content.clone())).collect()
            );
            match &self.reply {
                Some(text) => Ok(CompletionResponse { response: text.clone() }),
                None => Err("provider unreachable".into()),
            }
        }
    }

    fn agent_with(client: Arc<StubChatClient>) -> ChatAgent {
        ChatAgent::with_parts(client, Arc::new(MemoryHistoryStore::new()), 20)
    }

    async fn history(agent: &ChatAgent, id: &str) -> Vec<(Role, String)> {
        agent
            .history_store()
            .get_conversation(id, usize::MAX).await
            .messages.into_iter()
            .map(|m| (m.role, m.content))
            .collect()
    }

    #[tokio::test]
    async fn success_appends_user_then_assistant_and_returns_reply() {
        let client = Arc::new(StubChatClient::replying("sure thing"));
        let agent = agent_with(client.clone());

        let reply = agent.handle_message("conv", "do it").await.unwrap();
        assert_eq!(reply, "sure thing");
        assert_eq!(
            history(&agent, "conv").await,
            vec![
                (Role::User, "do it".to_string()),
                (Role::Assistant, "sure thing".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn user_turn_is_recorded_before_provider_call() {
        let client = Arc::new(StubChatClient::replying("hi"));
        let agent = agent_with(client.clone());

        agent.handle_message("conv", "hello").await.unwrap();

        let contexts = client.contexts();
        assert_eq!(contexts.len(), 1);
        assert_eq!(
            contexts[0].last().unwrap(),
            &(Role::User, "hello".to_string())
        );
    }

    #[tokio::test]
    async fn provider_failure_keeps_user_turn_and_appends_no_reply() {
        let client = Arc::new(StubChatClient::failing());
        let agent = agent_with(client.clone());

        let err = agent.handle_message("conv", "anyone there?").await.unwrap_err();
        assert!(err.to_string().contains("completion provider failed"));
        assert_eq!(
            history(&agent, "conv").await,
            vec![(Role::User, "anyone there?".to_string())]
        );
        assert_eq!(client.contexts().len(), 1);
    }

    #[tokio::test]
    async fn blank_reply_is_normalized() {
        let client = Arc::new(StubChatClient::replying("   \n"));
        let agent = agent_with(client);

        let reply = agent.handle_message("conv", "hm").await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn context_is_bounded_by_history_limit() {
        let client = Arc::new(StubChatClient::replying("short"));
        let agent = ChatAgent::with_parts(
            client.clone(),
            Arc::new(MemoryHistoryStore::new()),
            2
        );

        agent.handle_message("conv", "one").await.unwrap();
        agent.handle_message("conv", "two").await.unwrap();

        let contexts = client.contexts();
        // Second call sees only the trailing two turns.
        assert_eq!(
            contexts[1],
            vec![
                (Role::Assistant, "short".to_string()),
                (Role::User, "two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn prior_turns_flow_into_later_calls() {
        let client = Arc::new(StubChatClient::replying("I'm well"));
        let agent = agent_with(client.clone());

        agent.history_store().add_message("+1555", Role::User, "hi").await;
        let reply = agent.handle_message("+1555", "how are you").await.unwrap();

        assert_eq!(reply, "I'm well");
        assert_eq!(
            history(&agent, "+1555").await,
            vec![
                (Role::User, "hi".to_string()),
                (Role::User, "how are you".to_string()),
                (Role::Assistant, "I'm well".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn reset_wipes_the_conversation() {
        let client = Arc::new(StubChatClient::replying("hello"));
        let agent = agent_with(client);

        agent.handle_message("conv", "hi").await.unwrap();
        agent.reset("conv").await;

        assert!(history(&agent, "conv").await.is_empty());
    }
}
