//! Display strings derived from build metadata
//!
//! Plain fallback text, the markdown summary and the attachment color.

use crate::drone::{Build, Repo};
use crate::error::{NotifyError, Result};

/// Build outcome as reported by the CI runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Error,
    Killed,
    /// Anything else (pending, running, blocked, ...)
    Other,
}

impl Status {
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "error" => Self::Error,
            "killed" => Self::Killed,
            _ => Self::Other,
        }
    }

    /// Slack attachment color for this status
    pub fn color(self) -> &'static str {
        match self {
            Self::Success => "good",
            Self::Failure | Self::Error | Self::Killed => "danger",
            Self::Other => "warning",
        }
    }
}

/// Attachment color for a raw status token
pub fn color_for(status: &str) -> &'static str {
    Status::parse(status).color()
}

fn short_commit(build: &Build) -> Result<&str> {
    build.short_commit().ok_or_else(|| {
        NotifyError::InvalidInput(format!(
            "commit hash must be at least 8 characters, got '{}'",
            build.commit
        ))
    })
}

/// Plain text summary used as the attachment fallback
///
/// `success acme/app#abcdef12 (main) by joe`
pub fn short_summary(repo: &Repo, build: &Build) -> Result<String> {
    Ok(format!(
        "{} {}/{}#{} ({}) by {}",
        build.status,
        repo.owner,
        repo.name,
        short_commit(build)?,
        build.branch,
        build.author,
    ))
}

/// Markdown summary with the status in bold and the slug linked to the build
///
/// `*success* <http://x|acme/app#abcdef12> (main) by joe`
pub fn rich_summary(repo: &Repo, build: &Build) -> Result<String> {
    Ok(format!(
        "*{}* <{}|{}/{}#{}> ({}) by {}",
        build.status,
        build.link,
        repo.owner,
        repo.name,
        short_commit(build)?,
        build.branch,
        build.author,
    ))
}

/// Prefix `s` with `prefix` unless it already starts with it
pub fn prepend(prefix: &str, s: &str) -> String {
    if s.starts_with(prefix) {
        s.to_string()
    } else {
        format!("{prefix}{s}")
    }
}
