use serde::Deserialize;

/// Subscription verification query parameters for `GET /webhook`.
#[derive(Deserialize, Debug)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

// Inbound notification shape of the WhatsApp Cloud API. Every field is
// optional: Meta sends several notification kinds through the same route
// and we only care about text messages.
#[derive(Deserialize, Debug, Default)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Change {
    pub value: Option<ChangeValue>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChangeValue {
    /// Delivery/read receipts. Present means this is a status callback.
    pub statuses: Option<serde_json::Value>,
    pub messages: Option<Vec<Message>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Message {
    pub id: Option<String>,
    pub from: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<TextBody>,
}

#[derive(Deserialize, Debug, Default)]
pub struct TextBody {
    pub body: Option<String>,
}

/// One inbound text message, reduced to what the relay consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: String,
    pub sender: String,
    pub text: String,
}

/// What the `POST /webhook` body turned out to contain.
#[derive(Debug, PartialEq, Eq)]
pub enum Notification {
    /// Delivery/read status callback, nothing to process.
    Status,
    /// No messages in the payload.
    Empty,
    Messages(Vec<InboundMessage>),
}

impl WebhookPayload {
    /// Reduces the nested Graph payload to the `(sender, text)` pairs the
    /// relay acts on. Status callbacks and non-text messages are reported
    /// but never processed.
    pub fn extract(&self) -> Notification {
        let value = match self
            .entry
            .first()
            .and_then(|e| e.changes.first())
            .and_then(|c| c.value.as_ref())
        {
            Some(v) => v,
            None => return Notification::Empty,
        };

        if value.statuses.is_some() {
            return Notification::Status;
        }

        let messages = match value.messages.as_ref() {
            Some(msgs) if !msgs.is_empty() => msgs,
            _ => return Notification::Empty,
        };

        let inbound: Vec<InboundMessage> = messages
            .iter()
            .filter(|m| m.kind.as_deref() == Some("text"))
            .filter_map(|m| {
                Some(InboundMessage {
                    message_id: m.id.clone()?,
                    sender: m.from.clone()?,
                    text: m.text.as_ref()?.body.clone()?,
                })
            })
            .collect();

        if inbound.is_empty() {
            // Messages were present but none were text we can relay.
            Notification::Empty
        } else {
            Notification::Messages(inbound)
        }
    }
}
