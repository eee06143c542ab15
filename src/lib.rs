pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;
pub mod identity;
pub mod whatsapp;

use agent::ChatAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Graph API Base: {}", args.graph_api_base);
    info!("Phone Number ID: {}", args.phone_number_id);
    info!("History Context Limit: {}", args.history_context_limit);
    info!("Dedupe TTL (s): {}", args.dedupe_ttl_secs);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("(built-in)"));
    info!("-------------------------");

    let agent = Arc::new(ChatAgent::new(&args)?);
    let server = Server::new(agent, &args)?;
    server.run().await?;

    Ok(())
}
