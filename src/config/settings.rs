use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NotifyError, Result};

/// Plugin settings: where and how the notification is posted
///
/// Optional behaviors are `None` when unset; empty strings are normalized
/// away by [`Config::normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Incoming webhook URL
    pub webhook: String,
    /// Channel to post to, without or with the leading `#`
    pub channel: Option<String>,
    /// User to message directly; wins over `channel`
    pub recipient: Option<String>,
    /// Display name of the bot
    pub username: Option<String>,
    /// Message template replacing the default summary
    pub template: Option<String>,
    /// File whose contents are appended to the message
    pub attachment_file: Option<PathBuf>,
    pub image_url: Option<String>,
    pub icon_url: Option<String>,
    pub icon_emoji: Option<String>,
    /// Ask Slack to turn `@names` into mentions
    pub link_names: bool,
}

impl Config {
    /// Load settings from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NotifyError::Config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config.normalized())
    }

    /// Layer `overrides` on top of these settings
    ///
    /// Values set in `overrides` win; unset ones keep the current value.
    /// Recipient and channel move as a pair: when `overrides` names either,
    /// both come from `overrides`.
    pub fn merge(self, overrides: Config) -> Self {
        let overrides = overrides.normalized();
        let (recipient, channel) =
            if overrides.recipient.is_some() || overrides.channel.is_some() {
                (overrides.recipient, overrides.channel)
            } else {
                (self.recipient, self.channel)
            };
        Self {
            webhook: if overrides.webhook.is_empty() {
                self.webhook
            } else {
                overrides.webhook
            },
            channel,
            recipient,
            username: overrides.username.or(self.username),
            template: overrides.template.or(self.template),
            attachment_file: overrides.attachment_file.or(self.attachment_file),
            image_url: overrides.image_url.or(self.image_url),
            icon_url: overrides.icon_url.or(self.icon_url),
            icon_emoji: overrides.icon_emoji.or(self.icon_emoji),
            link_names: overrides.link_names || self.link_names,
        }
        .normalized()
    }

    /// Turn empty optional values into `None`
    pub fn normalized(self) -> Self {
        Self {
            webhook: self.webhook.trim().to_string(),
            channel: non_empty(self.channel),
            recipient: non_empty(self.recipient),
            username: non_empty(self.username),
            template: non_empty(self.template),
            attachment_file: self
                .attachment_file
                .filter(|p| !p.as_os_str().is_empty()),
            image_url: non_empty(self.image_url),
            icon_url: non_empty(self.icon_url),
            icon_emoji: non_empty(self.icon_emoji),
            link_names: self.link_names,
        }
    }

    /// Get the webhook URL or return an error with instructions
    pub fn require_webhook(&self) -> Result<&str> {
        if self.webhook.is_empty() {
            return Err(NotifyError::InvalidInput(
                "webhook URL not configured. Set PLUGIN_WEBHOOK or pass --webhook.".to_string(),
            ));
        }
        Ok(&self.webhook)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
