use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the webhook server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    /// Token Meta echoes back during webhook subscription verification.
    #[arg(long, env = "VERIFY_TOKEN")]
    pub verify_token: String,

    // --- WhatsApp Business API Args ---
    /// Bearer token for the WhatsApp Cloud API.
    #[arg(long, env = "WHATSAPP_TOKEN")]
    pub whatsapp_token: String,

    /// Phone number id the replies are sent from.
    #[arg(long, env = "PHONE_NUMBER_ID")]
    pub phone_number_id: String,

    /// Base URL of the Graph API (override for testing).
    #[arg(long, env = "GRAPH_API_BASE", default_value = "https://graph.facebook.com/v21.0")]
    pub graph_api_base: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (gemini, openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-2.5-flash, gpt-4o-mini)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    // --- Conversation Args ---
    /// Number of most recent turns sent to the provider as context.
    /// The stored transcript itself is unbounded.
    #[arg(long, env = "HISTORY_CONTEXT_LIMIT", default_value = "20")]
    pub history_context_limit: usize,

    /// Secret used only to hash sender ids (do NOT reuse VERIFY_TOKEN).
    #[arg(long, env = "UID_SALT", default_value = "change-me-please")]
    pub uid_salt: String,

    /// Seconds an inbound message id is remembered for duplicate delivery
    /// suppression.
    #[arg(long, env = "DEDUPE_TTL_SECS", default_value = "86400")]
    pub dedupe_ttl_secs: u64,

    /// Optional path to a JSON prompt configuration file.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,
}
