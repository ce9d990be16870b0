pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{catalog::ResponseTemplate, error::ReactionError, types::Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the outbound calls the bot makes to a chat platform
/// like Slack. Implementing this trait allows different chat services (or
/// mocks) to be used with the helpdesk-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier the bot posts under, which is used to
    /// avoid reacting to the bot's own messages.
    fn bot_user_id(&self) -> &str;

    /// Send a template to a channel thread.
    async fn send_message(&self, channel_id: &str, thread_ts: &str, template: &ResponseTemplate) -> Void;

    /// React to a message with an emoji.
    ///
    /// Fails with [`ReactionError::AlreadyReacted`] when the bot already
    /// added this reaction to the message.
    async fn react_to_message(&self, channel_id: &str, timestamp: &str, emoji: &str) -> Result<(), ReactionError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
