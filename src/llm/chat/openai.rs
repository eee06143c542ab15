use async_trait::async_trait;
use log::info;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, CompletionResponse };
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
    system_instruction: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        system_instruction: Option<String>
    ) -> Self {
        Self {
            http: HttpClient::new(),
            api_key,
            model: model.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            system_instruction,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "OpenAI API key is required for OpenAIChatClient".to_string())?;

        Ok(
            Self::new(
                api_key,
                config.completion_model.clone(),
                config.base_url.clone(),
                config.system_instruction.clone()
            )
        )
    }

    fn request_messages(&self, messages: &[ChatMessage]) -> Vec<OpenAIMessage> {
        let mut out = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system_instruction {
            out.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for msg in messages {
            out.push(OpenAIMessage {
                role: msg.role.to_string(),
                content: msg.content.clone(),
            });
        }
        out
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        info!("OpenAIChatClient::complete() → model={} context_turns={}", self.model, messages.len());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", self.api_key))?);

        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: self.request_messages(messages),
            temperature: 0.7,
        };

        let resp = self.http
            .post(&url)
            .headers(headers)
            .json(&req)
            .send().await?
            .error_for_status()?;

        let data = resp.json::<OpenAIResponse>().await?;
        let text = data.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or("OpenAI response contained no choices")?;

        Ok(CompletionResponse { response: text })
    }
}
