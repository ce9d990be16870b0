//! Handling of a single inbound event: parse, classify, act.

use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        catalog::Catalog,
        error::{HandlerError, ReactionError},
        types::{Action, BotIdentity, EventEnvelope, EventKind, IgnoreReason, InboundEvent, Reply},
    },
    interaction::rules,
    service::chat::ChatClient,
};

/// The successful result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Echo the verification challenge back to the caller.
    Challenge(String),
    /// The event was handled (including when nothing needed to be sent).
    Handled,
}

/// Parse a raw request body into an [`InboundEvent`].
pub fn parse_event(body: &[u8]) -> Result<InboundEvent, HandlerError> {
    let envelope: EventEnvelope = serde_json::from_slice(body).map_err(HandlerError::InvalidPayload)?;

    Ok(envelope.into())
}

/// Handle one raw event body end to end.
///
/// At most one message is sent and at most one reaction is added per call.
#[instrument(skip_all)]
pub async fn handle_event(body: &[u8], today: NaiveDate, chat: &ChatClient, catalog: &Catalog) -> Result<Outcome, HandlerError> {
    let event = parse_event(body)?;
    let bot = BotIdentity::new(chat.bot_user_id());

    let action = rules::classify(&event, today, &bot, catalog);

    execute(action, &event, chat, catalog).await
}

/// Carry out a classified action through the chat client.
#[instrument(skip_all)]
pub async fn execute(action: Action, event: &InboundEvent, chat: &ChatClient, catalog: &Catalog) -> Result<Outcome, HandlerError> {
    match action {
        Action::RespondChallenge(challenge) => {
            info!("Challenge passed! Challenge: {}", challenge);
            Ok(Outcome::Challenge(challenge))
        }
        Action::SendMessage(reply) => {
            send_reply(&reply, chat, catalog).await?;
            Ok(Outcome::Handled)
        }
        Action::ReactAndSend { reaction, reply } => {
            if let Err(e) = chat.react_to_message(&reaction.channel_id, &reaction.timestamp, &reaction.name).await {
                match &e {
                    ReactionError::AlreadyReacted => info!("Reaction `{}` already present on {}; skipping the acknowledgement.", reaction.name, reaction.timestamp),
                    ReactionError::Other(err) => error!("Error occurred while reacting to {}: {}", reaction.timestamp, err),
                }

                return Err(e.into());
            }

            send_reply(&reply, chat, catalog).await?;
            Ok(Outcome::Handled)
        }
        Action::Ignore(reason) => {
            match reason {
                IgnoreReason::UnhandledEventType => info!("Received unrecognized event type: '{}'", kind_name(event)),
                IgnoreReason::OwnMessage => info!("Ignoring message from bot itself."),
                IgnoreReason::NoMatchingRule => info!("No rule matched; not responding."),
            }

            Ok(Outcome::Handled)
        }
        Action::RejectInvalid(rejection) => {
            let err = HandlerError::from(rejection);
            warn!("Rejecting event: {}", err);
            Err(err)
        }
    }
}

/// Send one catalog template as a threaded reply.
async fn send_reply(reply: &Reply, chat: &ChatClient, catalog: &Catalog) -> Result<(), HandlerError> {
    info!("Replying with {:?} in {} ...", reply.template, reply.channel_id);

    let template = catalog.template(reply.template);

    chat.send_message(&reply.channel_id, &reply.thread_ts, template).await.map_err(|e| {
        error!("Failed to send {:?}: {}", reply.template, e);
        HandlerError::Upstream(e)
    })
}

fn kind_name(event: &InboundEvent) -> &str {
    match &event.kind {
        EventKind::UrlVerification => "url_verification",
        EventKind::Message => "message",
        EventKind::Other(kind) => kind,
    }
}
