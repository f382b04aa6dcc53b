//! Narrow interface over the external `git` binary.
//!
//! The diff engine never shells out; everything process-related lives here,
//! scoped to one repository working directory.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Author information for one recorded commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: String,
}

/// One commit in a project's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub commit: String,
    pub subject: String,
    pub body: String,
    pub author: CommitAuthor,
}

/// Pretty format emitting unit-separated fields and record-separated
/// commits, so the output parses without guessing at delimiters.
const LOG_FORMAT: &str = "%H%x1f%s%x1f%b%x1f%aN%x1f%aE%x1f%aD%x1e";

/// Parse `git log` output produced with [`LOG_FORMAT`].
fn parse_log(raw: &str) -> Vec<CommitRecord> {
    raw.split('\u{1e}')
        .filter_map(|record| {
            let fields: Vec<&str> = record.trim().split('\u{1f}').collect();
            if fields.len() != 6 {
                return None;
            }
            Some(CommitRecord {
                commit: fields[0].to_string(),
                subject: fields[1].to_string(),
                body: fields[2].trim_end().to_string(),
                author: CommitAuthor {
                    name: fields[3].to_string(),
                    email: fields[4].to_string(),
                    date: fields[5].to_string(),
                },
            })
        })
        .collect()
}

/// A git repository rooted at one project workspace.
#[derive(Clone, Debug)]
pub struct GitRepo {
    work_dir: PathBuf,
}

impl GitRepo {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .with_context(|| format!("failed to spawn git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(output)
    }

    /// Initialize a repository in the working directory.
    pub fn init(&self) -> Result<()> {
        self.run(&["init"]).map(|_| ())
    }

    /// Stage every change in the working directory.
    pub fn stage_all(&self) -> Result<()> {
        self.run(&["add", "."]).map(|_| ())
    }

    /// Record a commit with the given message.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    /// Push to the configured remote.
    pub fn push(&self) -> Result<()> {
        self.run(&["push"]).map(|_| ())
    }

    /// The commit history, newest first.
    pub fn log(&self) -> Result<Vec<CommitRecord>> {
        let format = format!("--pretty=format:{}", LOG_FORMAT);
        let output = self.run(&["log", &format])?;
        Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_records() {
        let raw = "abc123\u{1f}Stage: +2 blocks\u{1f}\u{1f}Ada\u{1f}ada@example.com\u{1f}\
                   Mon, 1 Jan 2024 00:00:00 +0000\u{1e}\n\
                   def456\u{1f}Sprite1: add pop\u{1f}details\nmore\u{1f}Bob\u{1f}\
                   bob@example.com\u{1f}Tue, 2 Jan 2024 00:00:00 +0000\u{1e}";

        let records = parse_log(raw);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].commit, "abc123");
        assert_eq!(records[0].subject, "Stage: +2 blocks");
        assert_eq!(records[0].body, "");
        assert_eq!(records[0].author.name, "Ada");
        assert_eq!(records[0].author.email, "ada@example.com");

        // A body may span lines; only trailing whitespace is stripped.
        assert_eq!(records[1].body, "details\nmore");
        assert_eq!(records[1].author.date, "Tue, 2 Jan 2024 00:00:00 +0000");
    }

    #[test]
    fn test_parse_log_empty_output() {
        assert_eq!(parse_log(""), vec![]);
    }

    #[test]
    fn test_commit_record_serialization() {
        let record = CommitRecord {
            commit: "abc123".to_string(),
            subject: "Stage: +2 blocks".to_string(),
            body: String::new(),
            author: CommitAuthor {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                date: "Mon, 1 Jan 2024 00:00:00 +0000".to_string(),
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"subject\":\"Stage: +2 blocks\""));
        assert!(json.contains("\"name\":\"Ada\""));
    }
}
