//! Event handling and user interactions for helpdesk-bot.
//!
//! This module provides the classify-and-respond logic:
//! - Deciding, per inbound event, which canned response (if any) to send
//! - Executing that decision through the chat client

pub mod event;
pub mod rules;
