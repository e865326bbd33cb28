mod client;
pub mod payload;

pub use client::{Dispatch, WebhookClient};
pub use payload::{Attachment, WebhookPayload};
