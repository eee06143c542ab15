use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;
use log::info;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    system_instruction: Option<String>,
}

#[derive(Serialize)]
struct OllamaChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(
        base_url: Option<String>,
        completion_model: Option<String>,
        system_instruction: Option<String>
    ) -> Self {
        let model = completion_model.unwrap_or_else(|| "cogito:3b".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            system_instruction,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != crate::llm::LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(
            Self::new(
                config.base_url.clone(),
                config.completion_model.clone(),
                config.system_instruction.clone()
            )
        )
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/chat", self.base_url);
        info!(
            "OllamaClient::complete() → model={} context_turns={}",
            self.completion_model,
            messages.len()
        );

        let mut chat_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system_instruction {
            chat_messages.push(OllamaChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for msg in messages {
            chat_messages.push(OllamaChatMessage {
                role: msg.role.to_string(),
                content: msg.content.clone(),
            });
        }

        let req = OllamaChatRequest {
            model: self.completion_model.clone(),
            messages: chat_messages,
            stream: false,
        };

        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<OllamaChatResponse>().await?;

        Ok(CompletionResponse { response: data.message.content })
    }
}
