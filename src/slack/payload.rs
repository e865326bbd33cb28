use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{NotifyError, Result};
use crate::format;
use crate::plugin::Plugin;
use crate::template;

/// Attachment fields Slack should render as markdown
const MARKDOWN_FIELDS: [&str; 2] = ["text", "fallback"];

/// Body of an incoming-webhook POST
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    /// `"1"` when mentions should be linked, absent otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_names: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Styled message block carried by the payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub fallback: String,
    pub color: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub mrkdwn_in: Vec<String>,
}

impl WebhookPayload {
    /// The single attachment every notification carries
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachments.first()
    }
}

/// Assemble the webhook payload for a build
///
/// Steps run in a fixed order:
/// 1. fallback text and color from the build status
/// 2. message text from the template when set, the default summary otherwise
/// 3. attachment file contents appended to the text
/// 4. routing: recipient, then channel, then the webhook's own default
/// 5. icon, username and the link-names toggle
pub fn build(plugin: &Plugin) -> Result<WebhookPayload> {
    let Plugin {
        repo,
        build,
        config,
        ..
    } = plugin;

    let fallback = format::short_summary(repo, build)?;
    let color = format::color_for(&build.status);
    debug!(%fallback, color, "computed summary");

    let mut text = match &config.template {
        Some(tpl) => template::render(tpl, plugin)?,
        None => format::rich_summary(repo, build)?,
    };

    if let Some(path) = &config.attachment_file {
        let bytes = fs::read(path).map_err(|e| NotifyError::attachment_file(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "appending attachment file");
        text = format!("{text}\n{}", String::from_utf8_lossy(&bytes));
    }

    let channel = destination(config);
    debug!(destination = ?channel, "resolved destination");

    let attachment = Attachment {
        fallback,
        color: color.to_string(),
        text,
        image_url: config.image_url.clone(),
        mrkdwn_in: MARKDOWN_FIELDS.iter().map(|f| f.to_string()).collect(),
    };

    Ok(WebhookPayload {
        channel,
        username: config.username.clone(),
        icon_url: config.icon_url.clone(),
        icon_emoji: config.icon_emoji.clone(),
        link_names: config.link_names.then(|| "1".to_string()),
        attachments: vec![attachment],
    })
}

/// Where the message goes: `@recipient`, else `#channel`, else the webhook default
pub fn destination(config: &Config) -> Option<String> {
    match (&config.recipient, &config.channel) {
        (Some(recipient), channel) => {
            if channel.is_some() {
                debug!("recipient and channel both set; using recipient");
            }
            Some(format::prepend("@", recipient))
        }
        (None, Some(channel)) => Some(format::prepend("#", channel)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drone::{Author, Build, Job, Repo};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn plugin(config: Config) -> Plugin {
        Plugin {
            repo: Repo::new("acme", "app"),
            build: Build {
                status: "success".to_string(),
                link: "http://x".to_string(),
                commit: "abcdef1234".to_string(),
                branch: "main".to_string(),
                author: Author::from_username("joe"),
                ..Build::default()
            },
            config,
            job: Job::default(),
        }
    }

    #[test]
    fn test_default_text_without_template() {
        let payload = build(&plugin(Config::default())).unwrap();
        let attachment = payload.attachment().unwrap();

        assert_eq!(attachment.text, "*success* <http://x|acme/app#abcdef12> (main) by joe");
        assert_eq!(attachment.fallback, "success acme/app#abcdef12 (main) by joe");
        assert_eq!(attachment.color, "good");
        assert_eq!(attachment.mrkdwn_in, vec!["text", "fallback"]);
        assert!(payload.channel.is_none());
        assert!(payload.link_names.is_none());
    }

    #[test]
    fn test_template_replaces_text_only() {
        let config = Config {
            template: Some("build {{ build.status }} on {{ build.branch }}".to_string()),
            ..Config::default()
        };
        let payload = build(&plugin(config)).unwrap();
        let attachment = payload.attachment().unwrap();

        assert_eq!(attachment.text, "build success on main");
        assert_eq!(attachment.fallback, "success acme/app#abcdef12 (main) by joe");
    }

    #[test]
    fn test_template_error_aborts() {
        let config = Config {
            template: Some("{{ nothing.here }}".to_string()),
            ..Config::default()
        };
        assert!(matches!(build(&plugin(config)), Err(NotifyError::Render(_))));
    }

    #[test]
    fn test_attachment_file_is_appended() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "3 tests failed").unwrap();

        let config = Config {
            attachment_file: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let payload = build(&plugin(config)).unwrap();

        assert_eq!(
            payload.attachment().unwrap().text,
            "*success* <http://x|acme/app#abcdef12> (main) by joe\n3 tests failed"
        );
    }

    #[test]
    fn test_attachment_file_with_non_utf8_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9 log line").unwrap();

        let config = Config {
            attachment_file: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let payload = build(&plugin(config)).unwrap();

        assert!(payload
            .attachment()
            .unwrap()
            .text
            .ends_with("\ncaf\u{FFFD} log line"));
    }

    #[test]
    fn test_missing_attachment_file() {
        let config = Config {
            attachment_file: Some("/definitely/not/here.txt".into()),
            ..Config::default()
        };
        let err = build(&plugin(config)).unwrap_err();
        assert!(matches!(err, NotifyError::AttachmentFile { .. }));
    }

    #[test]
    fn test_short_commit_fails() {
        let mut p = plugin(Config::default());
        p.build.commit = "abc".to_string();
        assert!(matches!(build(&p), Err(NotifyError::InvalidInput(_))));
    }

    #[test]
    fn test_destination_precedence() {
        let both = Config {
            recipient: Some("bob".to_string()),
            channel: Some("dev".to_string()),
            ..Config::default()
        };
        assert_eq!(destination(&both).as_deref(), Some("@bob"));

        let channel = Config {
            channel: Some("#dev".to_string()),
            ..Config::default()
        };
        assert_eq!(destination(&channel).as_deref(), Some("#dev"));

        let recipient = Config {
            recipient: Some("@bob".to_string()),
            ..Config::default()
        };
        assert_eq!(destination(&recipient).as_deref(), Some("@bob"));

        assert_eq!(destination(&Config::default()), None);
    }

    #[test]
    fn test_styling_fields() {
        let config = Config {
            username: Some("drone".to_string()),
            icon_emoji: Some(":rocket:".to_string()),
            image_url: Some("https://img.example/ok.png".to_string()),
            link_names: true,
            ..Config::default()
        };
        let mut p = plugin(config);
        p.build.status = "killed".to_string();
        let payload = build(&p).unwrap();

        assert_eq!(payload.username.as_deref(), Some("drone"));
        assert_eq!(payload.icon_emoji.as_deref(), Some(":rocket:"));
        assert_eq!(payload.link_names.as_deref(), Some("1"));
        let attachment = payload.attachment().unwrap();
        assert_eq!(attachment.color, "danger");
        assert_eq!(attachment.image_url.as_deref(), Some("https://img.example/ok.png"));
    }

    #[test]
    fn test_json_shape() {
        let config = Config {
            channel: Some("dev".to_string()),
            ..Config::default()
        };
        let payload = build(&plugin(config)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["channel"], "#dev");
        assert!(value.get("link_names").is_none());
        assert!(value.get("icon_url").is_none());
        assert_eq!(value["attachments"][0]["color"], "good");
        assert_eq!(value["attachments"][0]["mrkdwn_in"][1], "fallback");
        assert!(value["attachments"][0].get("image_url").is_none());
    }
}
