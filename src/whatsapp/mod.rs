use log::error;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::error::Error;
use std::time::Duration;

#[derive(Serialize)]
struct SendMessageRequest {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody,
}

#[derive(Serialize)]
struct TextBody {
    body: String,
}

impl SendMessageRequest {
    fn text(to: &str, body: &str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to: to.to_string(),
            kind: "text",
            text: TextBody { body: body.to_string() },
        }
    }
}

/// Outbound side of the WhatsApp Cloud API. Message content is never
/// logged, only status codes.
pub struct WhatsAppClient {
    http: HttpClient,
    token: String,
    messages_url: String,
}

impl WhatsAppClient {
    pub fn new(
        graph_api_base: &str,
        phone_number_id: &str,
        token: String
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let http = HttpClient::builder().timeout(Duration::from_secs(10)).build()?;
        let messages_url = format!(
            "{}/{}/messages",
            graph_api_base.trim_end_matches('/'),
            phone_number_id
        );

        Ok(Self { http, token, messages_url })
    }

    pub async fn send(
        &self,
        recipient: &str,
        body: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let resp = self.http
            .post(&self.messages_url)
            .bearer_auth(&self.token)
            .json(&SendMessageRequest::text(recipient, body))
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            error!("WhatsApp send failed with status {}", status.as_u16());
            return Err(format!("WhatsApp API returned status {}", status.as_u16()).into());
        }

        Ok(())
    }
}
