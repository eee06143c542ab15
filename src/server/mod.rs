pub mod dedupe;
pub mod webhook;

use crate::agent::ChatAgent;
use crate::cli::Args;
use crate::server::dedupe::SeenMessages;
use crate::server::webhook::AppState;
use crate::whatsapp::WhatsAppClient;
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    addr: String,
    state: AppState,
}

impl Server {
    pub fn new(agent: Arc<ChatAgent>, args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let whatsapp = WhatsAppClient::new(
            &args.graph_api_base,
            &args.phone_number_id,
            args.whatsapp_token.clone()
        )?;

        let state = AppState {
            agent,
            whatsapp: Arc::new(whatsapp),
            seen: Arc::new(SeenMessages::new(Duration::from_secs(args.dedupe_ttl_secs))),
            verify_token: args.verify_token.clone(),
            uid_salt: args.uid_salt.clone(),
        };

        Ok(Self {
            addr: args.server_addr.clone(),
            state,
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = webhook::router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("Webhook server listening on: http://{}", self.addr);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
