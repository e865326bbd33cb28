use std::fs;
use std::path::{Path, PathBuf};

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser};

use crate::config::Config;
use crate::drone::{Author, Build, Job, Message, Repo};
use crate::error::{NotifyError, Result};
use crate::plugin::Plugin;

/// Send a CI build notification to a Slack incoming webhook
#[derive(Parser, Debug)]
#[command(name = "drone-slack")]
#[command(version)]
#[command(about = "Send a CI build notification to a Slack incoming webhook")]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub build: BuildArgs,

    /// Print the payload as JSON instead of sending it
    #[arg(long, env = "PLUGIN_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Plugin settings
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Plugin settings")]
pub struct SettingsArgs {
    /// TOML file with plugin settings; flags and environment win over it
    #[arg(long = "config", env = "PLUGIN_CONFIG", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Slack incoming webhook URL [fallback env: SLACK_WEBHOOK]
    #[arg(long, env = "PLUGIN_WEBHOOK", hide_env_values = true)]
    pub webhook: Option<String>,

    /// Channel to post to [fallback env: SLACK_CHANNEL]
    #[arg(long, env = "PLUGIN_CHANNEL")]
    pub channel: Option<String>,

    /// User to message directly, wins over --channel [fallback env: SLACK_RECIPIENT]
    #[arg(long, env = "PLUGIN_RECIPIENT")]
    pub recipient: Option<String>,

    /// Bot display name [fallback env: SLACK_USERNAME]
    #[arg(long, env = "PLUGIN_USERNAME")]
    pub username: Option<String>,

    /// Message template [fallback env: SLACK_TEMPLATE]
    #[arg(long, env = "PLUGIN_TEMPLATE")]
    pub template: Option<String>,

    /// Read the message template from a file; used when no inline template is set
    #[arg(long, env = "PLUGIN_TEMPLATE_FILE", value_name = "FILE")]
    pub template_file: Option<PathBuf>,

    /// File whose contents are appended to the message
    #[arg(long, env = "PLUGIN_ATTACHMENT_FILE", value_name = "FILE")]
    pub attachment_file: Option<PathBuf>,

    /// Image shown inside the attachment
    #[arg(long, env = "PLUGIN_IMAGE_URL")]
    pub image_url: Option<String>,

    /// Bot icon URL
    #[arg(long, env = "PLUGIN_ICON_URL")]
    pub icon_url: Option<String>,

    /// Bot icon emoji, e.g. :rocket:
    #[arg(long, env = "PLUGIN_ICON_EMOJI")]
    pub icon_emoji: Option<String>,

    /// Link @names and #channels in the message
    #[arg(long, env = "PLUGIN_LINK_NAMES", value_parser = FalseyValueParser::new())]
    pub link_names: bool,
}

/// Build metadata, normally provided by the CI runner
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Build metadata")]
pub struct BuildArgs {
    /// Repository owner
    #[arg(long, env = "DRONE_REPO_OWNER", default_value = "")]
    pub repo_owner: String,

    /// Repository name
    #[arg(long, env = "DRONE_REPO_NAME", default_value = "")]
    pub repo_name: String,

    /// Commit SHA (at least 8 characters)
    #[arg(long, env = "DRONE_COMMIT_SHA", default_value = "")]
    pub commit_sha: String,

    /// Git reference
    #[arg(long, env = "DRONE_COMMIT_REF", default_value = "refs/heads/master")]
    pub commit_ref: String,

    /// Git branch
    #[arg(long, env = "DRONE_COMMIT_BRANCH", default_value = "master")]
    pub commit_branch: String,

    /// Commit author username
    #[arg(long, env = "DRONE_COMMIT_AUTHOR", default_value = "")]
    pub commit_author: String,

    /// Commit author display name
    #[arg(long, env = "DRONE_COMMIT_AUTHOR_NAME", default_value = "")]
    pub commit_author_name: String,

    /// Commit author email
    #[arg(long, env = "DRONE_COMMIT_AUTHOR_EMAIL", default_value = "")]
    pub commit_author_email: String,

    /// Commit author avatar URL
    #[arg(long, env = "DRONE_COMMIT_AUTHOR_AVATAR", default_value = "")]
    pub commit_author_avatar: String,

    /// Commit message
    #[arg(long, env = "DRONE_COMMIT_MESSAGE", default_value = "")]
    pub commit_message: String,

    /// Pull request number
    #[arg(long, env = "DRONE_PULL_REQUEST", default_value = "")]
    pub pull_request: String,

    /// Build event (push, pull_request, tag, deployment)
    #[arg(long, env = "DRONE_BUILD_EVENT", default_value = "push")]
    pub build_event: String,

    /// Build number
    #[arg(long, env = "DRONE_BUILD_NUMBER", default_value_t = 0)]
    pub build_number: u64,

    /// Build status
    #[arg(long, env = "DRONE_BUILD_STATUS", default_value = "success")]
    pub build_status: String,

    /// Build link
    #[arg(long, env = "DRONE_BUILD_LINK", default_value = "")]
    pub build_link: String,

    /// Build started (unix timestamp)
    #[arg(long, env = "DRONE_BUILD_STARTED", default_value_t = 0)]
    pub build_started: i64,

    /// Build created (unix timestamp)
    #[arg(long, env = "DRONE_BUILD_CREATED", default_value_t = 0)]
    pub build_created: i64,

    /// Build tag
    #[arg(long, env = "DRONE_TAG", default_value = "")]
    pub tag: String,

    /// Deployment target
    #[arg(long, env = "DRONE_DEPLOY_TO", default_value = "")]
    pub deploy_to: String,

    /// Job started (unix timestamp)
    #[arg(long, env = "DRONE_JOB_STARTED", default_value_t = 0)]
    pub job_started: i64,
}

impl SettingsArgs {
    /// Plugin settings from flags, with legacy `SLACK_*` variables as fallback
    fn to_config(&self) -> Config {
        Config {
            webhook: self
                .webhook
                .clone()
                .or_else(|| legacy_env("SLACK_WEBHOOK"))
                .unwrap_or_default(),
            channel: self.channel.clone().or_else(|| legacy_env("SLACK_CHANNEL")),
            recipient: self
                .recipient
                .clone()
                .or_else(|| legacy_env("SLACK_RECIPIENT")),
            username: self.username.clone().or_else(|| legacy_env("SLACK_USERNAME")),
            template: self.template.clone().or_else(|| legacy_env("SLACK_TEMPLATE")),
            attachment_file: self.attachment_file.clone(),
            image_url: self.image_url.clone(),
            icon_url: self.icon_url.clone(),
            icon_emoji: self.icon_emoji.clone(),
            link_names: self.link_names,
        }
    }

    /// Resolve the final plugin settings
    pub fn resolve(&self) -> Result<Config> {
        let overrides = self.to_config();
        let mut config = match &self.config_file {
            Some(path) => Config::load_from(path)?.merge(overrides),
            None => overrides.normalized(),
        };

        if config.template.is_none() {
            if let Some(path) = &self.template_file {
                config.template = Some(load_template(path)?).filter(|t| !t.trim().is_empty());
            }
        }
        Ok(config)
    }
}

impl BuildArgs {
    pub fn repo(&self) -> Repo {
        Repo::new(&self.repo_owner, &self.repo_name)
    }

    pub fn to_build(&self) -> Build {
        Build {
            tag: self.tag.clone(),
            event: self.build_event.clone(),
            number: self.build_number,
            commit: self.commit_sha.clone(),
            git_ref: self.commit_ref.clone(),
            branch: self.commit_branch.clone(),
            author: Author {
                username: self.commit_author.clone(),
                name: self.commit_author_name.clone(),
                email: self.commit_author_email.clone(),
                avatar: self.commit_author_avatar.clone(),
            },
            pull: self.pull_request.clone(),
            message: Message::parse(&self.commit_message),
            deploy_to: self.deploy_to.clone(),
            status: self.build_status.clone(),
            link: self.build_link.clone(),
            started: self.build_started,
            created: self.build_created,
        }
    }

    pub fn job(&self) -> Job {
        Job {
            started: self.job_started,
        }
    }
}

impl Cli {
    /// Assemble the notification context from the parsed arguments
    pub fn to_plugin(&self) -> Result<Plugin> {
        Ok(Plugin {
            repo: self.build.repo(),
            build: self.build.to_build(),
            config: self.settings.resolve()?,
            job: self.build.job(),
        })
    }
}

fn legacy_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn load_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| NotifyError::attachment_file(path, e))
}
