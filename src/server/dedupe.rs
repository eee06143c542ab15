use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{ Duration, Instant };

/// In-memory record of WhatsApp message ids already processed. Meta
/// redelivers webhooks until they are acknowledged, so each id must be
/// handled at most once within the TTL.
pub struct SeenMessages {
    ttl: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl SeenMessages {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if `message_id` has not been seen within the TTL and
    /// should be processed; false for a duplicate delivery.
    pub fn mark_seen_once(&self, message_id: &str) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock().unwrap();
        seen.retain(|_, inserted_at| now.duration_since(*inserted_at) < self.ttl);

        match seen.get(message_id) {
            Some(_) => false,
            None => {
                seen.insert(message_id.to_string(), now);
                true
            }
        }
    }
}
