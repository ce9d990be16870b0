//! Slack implementation of the chat client.
//!
//! Outbound calls go through the Slack Web API (`auth.test`,
//! `chat.postMessage`, `reactions.add`) using slack-morphism over hyper-rustls.

use crate::base::{
    catalog::ResponseTemplate,
    config::Config,
    error::ReactionError,
    types::{Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tracing::{info, instrument};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Slack API error code returned when the reaction is already on the message.
const ALREADY_REACTED: &str = "already_reacted";

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    bot_token: SlackApiToken,
    bot_user_id: String,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self { bot_token, bot_user_id, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    #[instrument(skip(self, template))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, template: &ResponseTemplate) -> Void {
        let mut message = SlackMessageContent::new().opt_text(template.text.clone());

        if !template.blocks.is_empty() {
            message = message.with_blocks(template.slack_blocks()?);
        }

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_thread_ts(SlackTs(thread_ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: &str, timestamp: &str, emoji: &str) -> Result<(), ReactionError> {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(emoji.to_string()),
            timestamp: SlackTs(timestamp.to_string()),
        };

        let session = self.client.open_session(&self.bot_token);

        match session.reactions_add(&request).await {
            Ok(_) => Ok(()),
            Err(SlackClientError::ApiError(ae)) if ae.code == ALREADY_REACTED => Err(ReactionError::AlreadyReacted),
            Err(e) => Err(anyhow::anyhow!("Failed to react to message: {}", e).into()),
        }
    }
}
