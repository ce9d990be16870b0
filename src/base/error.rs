//! Error taxonomy for inbound event handling.

use super::types::Rejection;

/// Errors that terminate the handling of a single inbound event.
///
/// The `Display` text doubles as the short body returned to the webhook caller.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The request body is not valid structured data.
    #[error("Invalid JSON in request body")]
    InvalidPayload(#[source] serde_json::Error),

    /// A message event arrived without a user id.
    #[error("User ID is not provided in the message event.")]
    MissingUserId,

    /// The acknowledgement reaction is already on the message; handled as a no-op.
    #[error("The reaction has already been added to this message.")]
    AlreadyReacted,

    /// An outbound chat call failed.
    #[error("Error occurred while processing the event.")]
    Upstream(#[source] anyhow::Error),
}

impl HandlerError {
    /// Whether the caller should see a client error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, HandlerError::InvalidPayload(_) | HandlerError::MissingUserId)
    }

    /// Whether the event should still be acknowledged as a success.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, HandlerError::AlreadyReacted)
    }
}

impl From<Rejection> for HandlerError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingUserId => HandlerError::MissingUserId,
        }
    }
}

/// Errors returned by the chat client when adding a reaction.
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    /// The bot already reacted with this emoji.
    #[error("reaction already added")]
    AlreadyReacted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ReactionError> for HandlerError {
    fn from(err: ReactionError) -> Self {
        match err {
            ReactionError::AlreadyReacted => HandlerError::AlreadyReacted,
            ReactionError::Other(err) => HandlerError::Upstream(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_reacted_stays_idempotent() {
        let err = HandlerError::from(ReactionError::AlreadyReacted);

        assert!(err.is_idempotent());
        assert!(!err.is_client_error());
    }

    #[test]
    fn other_reaction_failures_are_upstream() {
        let err = HandlerError::from(ReactionError::from(anyhow::anyhow!("ratelimited")));

        assert!(matches!(err, HandlerError::Upstream(_)));
        assert!(!err.is_client_error());
        assert!(!err.is_idempotent());
    }

    #[test]
    fn missing_user_is_a_client_error() {
        let err = HandlerError::from(Rejection::MissingUserId);

        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "User ID is not provided in the message event.");
    }
}
