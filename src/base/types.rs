use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};

use super::catalog::TemplateKind;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Inbound payloads.

/// The raw body Slack posts to the events endpoint.
///
/// Every field is optional here; deciding what is required happens in the
/// classifier so that a missing field maps to a precise rejection.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event: Option<EventBody>,
}

/// The `event` object nested inside an [`EventEnvelope`].
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct EventBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// The kind of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UrlVerification,
    Message,
    Other(String),
}

impl From<Option<&str>> for EventKind {
    fn from(kind: Option<&str>) -> Self {
        match kind {
            Some("url_verification") => EventKind::UrlVerification,
            Some("message") => EventKind::Message,
            Some(other) => EventKind::Other(other.to_string()),
            None => EventKind::Other(String::new()),
        }
    }
}

/// A normalized inbound event, ready to be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub channel_id: String,
    pub user_id: Option<String>,
    /// The event's own timestamp; replies are threaded to it.
    pub ts: String,
    /// Present only when the message is itself a reply inside a thread.
    pub thread_ts: Option<String>,
    pub text: String,
    pub challenge: Option<String>,
}

impl InboundEvent {
    /// Whether the message is a top-level channel message (not a thread reply).
    pub fn is_top_level(&self) -> bool {
        self.thread_ts.is_none()
    }
}

impl From<EventEnvelope> for InboundEvent {
    fn from(envelope: EventEnvelope) -> Self {
        let body = envelope.event.unwrap_or_default();

        // Slack delivers `url_verification` at the top level, everything else inside `event`.
        let kind = EventKind::from(body.kind.as_deref().or(envelope.kind.as_deref()));

        Self {
            kind,
            channel_id: body.channel.unwrap_or_default(),
            user_id: body.user,
            ts: body.ts.unwrap_or_default(),
            thread_ts: body.thread_ts,
            text: body.text.unwrap_or_default(),
            challenge: envelope.challenge,
        }
    }
}

/// The identity the bot posts under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    pub bot_user_id: String,
}

impl BotIdentity {
    pub fn new(bot_user_id: impl Into<String>) -> Self {
        Self { bot_user_id: bot_user_id.into() }
    }
}

// Classifier output.

/// A threaded reply using one of the catalog templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub channel_id: String,
    pub thread_ts: String,
    pub template: TemplateKind,
}

/// An emoji reaction on an existing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub channel_id: String,
    pub timestamp: String,
    pub name: String,
}

/// Why an event produced no outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnhandledEventType,
    OwnMessage,
    NoMatchingRule,
}

/// Why an event was rejected as a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingUserId,
}

/// The single decision taken for an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RespondChallenge(String),
    SendMessage(Reply),
    ReactAndSend { reaction: Reaction, reply: Reply },
    Ignore(IgnoreReason),
    RejectInvalid(Rejection),
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> InboundEvent {
        serde_json::from_str::<EventEnvelope>(body).unwrap().into()
    }

    #[test]
    fn url_verification_is_read_from_the_envelope() {
        let event = parse(r#"{"type":"url_verification","challenge":"abc123","token":"x"}"#);

        assert_eq!(event.kind, EventKind::UrlVerification);
        assert_eq!(event.challenge.as_deref(), Some("abc123"));
    }

    #[test]
    fn event_type_wins_over_envelope_type() {
        let event = parse(r#"{"type":"event_callback","event":{"type":"message","channel":"C1","user":"U1","ts":"1.0","text":"hi"}}"#);

        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.channel_id, "C1");
        assert_eq!(event.user_id.as_deref(), Some("U1"));
        assert!(event.is_top_level());
    }

    #[test]
    fn empty_strings_are_absent() {
        let event = parse(r#"{"event":{"type":"message","user":"","thread_ts":"","ts":"1.0"}}"#);

        assert_eq!(event.user_id, None);
        assert_eq!(event.thread_ts, None);
        assert_eq!(event.text, "");
    }

    #[test]
    fn missing_type_is_other() {
        let event = parse(r#"{}"#);

        assert_eq!(event.kind, EventKind::Other(String::new()));
    }
}
