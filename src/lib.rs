//! Library root for `helpdesk-bot`.
//!
//! Helpdesk-bot watches a Slack support channel and answers the most common
//! account issues with canned guidance:
//! - Unlock, password-reset and 2FA re-enrollment instructions on weekdays
//! - A combined self-service message with an escalation path on weekends
//! - Acknowledgements for `THX` and `HELP` replies inside threads
//!
//! Slack delivers events to an HTTP webhook; each event is classified by a
//! small, ordered rule table and answered with at most one message.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the helpdesk-bot runtime:
/// - Initializes the crypto provider
/// - Loads the catalog and resolves the bot identity
/// - Serves the webhook until Ctrl-C
pub async fn start(config: Config) -> Void {
    info!("Starting helpdesk-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
