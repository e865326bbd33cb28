//! Format a CI build result as a Slack message and post it to an incoming webhook.
//!
//! The pipeline is: build metadata and settings ([`plugin::Plugin`]) →
//! text and styling ([`format`], [`template`]) → payload
//! ([`slack::payload::build`]) → one POST ([`slack::WebhookClient`]).

pub mod cli;
pub mod config;
pub mod drone;
pub mod error;
pub mod format;
pub mod logging;
pub mod plugin;
pub mod slack;
pub mod template;
