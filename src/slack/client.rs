use reqwest::blocking::Client;
use tracing::{debug, info};
use url::Url;

use super::payload::WebhookPayload;
use crate::error::{NotifyError, Result};

const USER_AGENT: &str = concat!("drone-slack/", env!("CARGO_PKG_VERSION"));

/// Something that can deliver a built payload
pub trait Dispatch {
    fn send(&self, payload: &WebhookPayload) -> Result<()>;
}

/// Slack incoming-webhook client
///
/// One POST per call, no retries. Uses the transport's default timeout.
pub struct WebhookClient {
    client: Client,
    url: Url,
}

impl WebhookClient {
    /// Create a client for the given webhook URL
    pub fn new(webhook: &str) -> Result<Self> {
        let url = Url::parse(webhook).map_err(|e| {
            NotifyError::InvalidInput(format!("Invalid webhook URL '{}': {}", webhook, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(NotifyError::InvalidInput(format!(
                "Webhook URL must use http or https: {}",
                webhook
            )));
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Dispatch for WebhookClient {
    fn send(&self, payload: &WebhookPayload) -> Result<()> {
        debug!(host = self.url.host_str().unwrap_or_default(), "posting to webhook");

        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(NotifyError::dispatch(status.as_u16(), message));
        }

        info!(status = status.as_u16(), "notification delivered");
        Ok(())
    }
}
