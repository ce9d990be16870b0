//! Runtime services and shared state for the helpdesk-bot.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    base::{
        catalog::Catalog,
        config::Config,
        types::{Res, Void},
    },
    service::{
        chat::ChatClient,
        webhook::{self, WebhookState},
    },
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the catalog, and the chat client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The keyword and template catalog.
    pub catalog: Arc<Catalog>,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Load the catalog.
        let catalog = Arc::new(Catalog::load(config.catalog_path.as_deref())?);

        match &config.catalog_path {
            Some(path) => info!("Loaded catalog from {}.", path.display()),
            None => info!("Using the built-in catalog."),
        }

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, catalog, chat })
    }

    /// Build the webhook state from this runtime.
    pub fn webhook_state(&self) -> Res<WebhookState> {
        let clock = match self.config.utc_offset_hours {
            Some(hours) => webhook::offset_clock(hours)?,
            None => webhook::local_clock(),
        };

        let mut state = WebhookState::new(self.chat.clone(), self.catalog.clone()).with_clock(clock);

        if let Some(secret) = &self.config.slack_signing_secret {
            state = state.with_signing_secret(secret);
        } else {
            info!("No signing secret configured; inbound requests are not verified.");
        }

        Ok(state)
    }

    pub async fn start(&self) -> Void {
        webhook::serve(&self.config, self.webhook_state()?).await
    }
}
