use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::drone::{Build, Job, Repo};
use crate::error::Result;
use crate::slack::{payload, Dispatch, WebhookClient, WebhookPayload};

/// Everything known about one notification: repository, build, settings and job
///
/// Built once per invocation and read-only afterwards. Serialized as the
/// template context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plugin {
    pub repo: Repo,
    pub build: Build,
    pub config: Config,
    pub job: Job,
}

impl Plugin {
    /// Build the webhook payload without sending it
    pub fn payload(&self) -> Result<WebhookPayload> {
        payload::build(self)
    }

    /// Build the payload and post it to the configured webhook
    pub fn exec(&self) -> Result<()> {
        let client = WebhookClient::new(self.config.require_webhook()?)?;
        self.exec_with(&client)
    }

    /// Build the payload and hand it to `dispatcher`
    ///
    /// Nothing is sent when building fails.
    pub fn exec_with(&self, dispatcher: &impl Dispatch) -> Result<()> {
        let payload = self.payload()?;
        debug!(
            repo = %self.repo.full_name(),
            build = self.build.number,
            status = %self.build.status,
            "sending notification"
        );
        dispatcher.send(&payload)
    }
}
