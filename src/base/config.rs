//! Load configuration via `config` crate with env-override support.

use std::{net::SocketAddr, ops::Deref, path::PathBuf, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Default listen address for the webhook server.
fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Default route for the Slack events endpoint.
fn default_events_path() -> String {
    "/slack/events".to_string()
}

/// Configuration for the helpdesk-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    /// When set, inbound requests must carry a valid Slack signature.
    #[serde(default)]
    pub slack_signing_secret: Option<String>,
    /// Address the webhook server listens on (`BIND_ADDRESS`).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Route of the events endpoint (`EVENTS_PATH`).
    #[serde(default = "default_events_path")]
    pub events_path: String,
    /// Optional catalog file that replaces the built-in keywords and templates (`CATALOG_PATH`).
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Fixed UTC offset used to decide the current day (`UTC_OFFSET_HOURS`).
    /// Falls back to the server's local time when unset.
    #[serde(default)]
    pub utc_offset_hours: Option<i32>,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("HELPDESK_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check the loaded values for consistency.
    pub fn validate(&self) -> Void {
        if self.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must not be empty."));
        }

        if self.slack_signing_secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(anyhow::anyhow!("Slack signing secret must not be empty when set."));
        }

        self.bind_address()?;

        if !self.events_path.starts_with('/') {
            return Err(anyhow::anyhow!("Events path must start with `/`."));
        }

        if let Some(offset) = self.utc_offset_hours
            && !(-12..=14).contains(&offset)
        {
            return Err(anyhow::anyhow!("UTC offset must be between -12 and 14 hours."));
        }

        Ok(())
    }

    /// The parsed listen address.
    pub fn bind_address(&self) -> Res<SocketAddr> {
        self.bind_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address `{}`: {}", self.bind_address, e))
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            slack_bot_token: "xoxb-test".to_string(),
            bind_address: default_bind_address(),
            events_path: default_events_path(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_defaults() {
        let config = Config::from(valid());

        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address().unwrap().port(), 3000);
    }

    #[test]
    fn rejects_empty_token() {
        let config = Config::from(ConfigInner {
            slack_bot_token: " ".to_string(),
            ..valid()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_bind_address() {
        let config = Config::from(ConfigInner {
            bind_address: "localhost".to_string(),
            ..valid()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_relative_events_path() {
        let config = Config::from(ConfigInner {
            events_path: "slack/events".to_string(),
            ..valid()
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_prefixed_environment() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            std::env::set_var("HELPDESK_BOT_SLACK_BOT_TOKEN", "xoxb-from-env");
            std::env::set_var("HELPDESK_BOT_EVENTS_PATH", "/hooks/slack");
        }

        let path = std::env::temp_dir().join(format!("helpdesk-bot-config-{}.toml", std::process::id()));
        std::fs::write(&path, "bind_address = \"127.0.0.1:8080\"\n").unwrap();

        let config = Config::load(Some(&path));
        let _ = std::fs::remove_file(&path);

        unsafe {
            std::env::remove_var("HELPDESK_BOT_SLACK_BOT_TOKEN");
            std::env::remove_var("HELPDESK_BOT_EVENTS_PATH");
        }

        let config = config.unwrap();
        assert_eq!(config.slack_bot_token, "xoxb-from-env");
        assert_eq!(config.events_path, "/hooks/slack");
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let config = Config::from(ConfigInner {
            utc_offset_hours: Some(15),
            ..valid()
        });

        assert!(config.validate().is_err());

        let config = Config::from(ConfigInner {
            utc_offset_hours: Some(2),
            ..valid()
        });

        assert!(config.validate().is_ok());
    }
}
