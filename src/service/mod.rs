//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the helpdesk-bot:
//! - Chat services (e.g., Slack), used for outbound replies and reactions
//! - The webhook server that receives inbound events
//!
//! The chat service defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod webhook;
