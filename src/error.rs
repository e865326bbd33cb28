use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for notification operations
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors that can occur while building or delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Build metadata or settings that cannot be used as given
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Template could not be parsed or expanded
    #[error("Failed to render template: {0}")]
    Render(#[from] tera::Error),

    /// Attachment (or template) file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    AttachmentFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Webhook answered with a non-success status
    #[error("Webhook rejected the message (HTTP {status}): {message}")]
    Dispatch { status: u16, message: String },

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload serialization error
    #[error("Failed to encode payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("Failed to parse settings file: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    /// Create a dispatch error from HTTP status and response body
    pub fn dispatch(status: u16, message: impl Into<String>) -> Self {
        Self::Dispatch {
            status,
            message: message.into(),
        }
    }

    /// Create an attachment file error for the given path
    pub fn attachment_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::AttachmentFile {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure happened while talking to the webhook
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. } | Self::Http(_))
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) => 2,
            Self::Render(_) => 3,
            Self::AttachmentFile { .. } => 4,
            Self::Dispatch { .. } | Self::Http(_) | Self::Json(_) => 5,
            Self::Config(_) | Self::Toml(_) | Self::Io(_) => 6,
        }
    }
}
