use std::fmt;

use serde::{Deserialize, Serialize};

/// Repository the build ran for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name` slug
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Commit author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl Author {
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Commit message split into a title line and a body
///
/// Displays as the original raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Raw message as received
    pub text: String,
    /// First line, trimmed
    pub title: String,
    /// Remaining lines, trimmed as a whole
    pub body: String,
}

impl Message {
    /// Split a raw commit message into title and body
    pub fn parse(raw: &str) -> Self {
        // split always yields at least one (possibly empty) segment
        let mut lines = raw.split('\n');
        let title = lines.next().unwrap_or_default().trim().to_string();
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

        Self {
            text: raw.to_string(),
            title,
            body,
        }
    }
}

impl From<&str> for Message {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Snapshot of a single CI run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub tag: String,
    pub event: String,
    pub number: u64,
    pub commit: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub branch: String,
    pub author: Author,
    pub pull: String,
    pub message: Message,
    pub deploy_to: String,
    pub status: String,
    pub link: String,
    /// Unix timestamp (seconds)
    pub started: i64,
    /// Unix timestamp (seconds)
    pub created: i64,
}

impl Build {
    /// Abbreviated commit hash used in summaries
    ///
    /// `None` when the hash is shorter than eight characters.
    pub fn short_commit(&self) -> Option<&str> {
        match self.commit.char_indices().nth(8) {
            Some((end, _)) => Some(&self.commit[..end]),
            None if self.commit.chars().count() == 8 => Some(&self.commit),
            None => None,
        }
    }
}

/// Currently running pipeline step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unix timestamp (seconds)
    pub started: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let msg = Message::parse("  Fix the build  ");
        assert_eq!(msg.title, "Fix the build");
        assert_eq!(msg.body, "");
        assert_eq!(msg.to_string(), "  Fix the build  ");
    }

    #[test]
    fn test_parse_title_and_body() {
        let raw = "Add retries\n\n  Retries the upload step.\nCloses #12\n";
        let msg = Message::parse(raw);
        assert_eq!(msg.title, "Add retries");
        assert_eq!(msg.body, "Retries the upload step.\nCloses #12");
        assert_eq!(msg.to_string(), raw);
    }

    #[test]
    fn test_parse_empty() {
        let msg = Message::parse("");
        assert_eq!(msg.title, "");
        assert_eq!(msg.body, "");
    }

    #[test]
    fn test_parse_crlf() {
        let msg = Message::parse("Title\r\nBody line\r\n");
        assert_eq!(msg.title, "Title");
        assert_eq!(msg.body, "Body line");
    }

    #[test]
    fn test_title_and_body_reconstruct_message() {
        for raw in ["one", "one\ntwo", "  one\ntwo\nthree  "] {
            let msg = Message::parse(raw);
            let joined = format!("{}\n{}", msg.title, msg.body);
            assert_eq!(joined.trim(), raw.trim(), "raw: {raw:?}");
        }
    }

    #[test]
    fn test_author_displays_username() {
        let author = Author {
            username: "octocat".to_string(),
            name: "The Octocat".to_string(),
            email: "octo@example.com".to_string(),
            avatar: String::new(),
        };
        assert_eq!(author.to_string(), "octocat");
    }

    #[test]
    fn test_short_commit() {
        let build = Build {
            commit: "abcdef1234".to_string(),
            ..Build::default()
        };
        assert_eq!(build.short_commit(), Some("abcdef12"));

        let short = Build {
            commit: "abc".to_string(),
            ..Build::default()
        };
        assert_eq!(short.short_commit(), None);
    }

    #[test]
    fn test_short_commit_counts_characters() {
        let build = Build {
            commit: "abcdefgéxyz".to_string(),
            ..Build::default()
        };
        assert_eq!(build.short_commit(), Some("abcdefgé"));

        let exact = Build {
            commit: "abcdefgé".to_string(),
            ..Build::default()
        };
        assert_eq!(exact.short_commit(), Some("abcdefgé"));

        let seven = Build {
            commit: "abcdefé".to_string(),
            ..Build::default()
        };
        assert_eq!(seven.short_commit(), None);
    }

    #[test]
    fn test_build_serializes_ref_key() {
        let build = Build {
            git_ref: "refs/heads/main".to_string(),
            ..Build::default()
        };
        let value = serde_json::to_value(&build).unwrap();
        assert_eq!(value["ref"], "refs/heads/main");
        assert_eq!(value["message"]["title"], "");
    }
}
