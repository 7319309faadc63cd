// src/model.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Position of a document in the tracked set
pub type DocumentIndex = usize;

/// A run of consecutive lines attributed to one commit by blame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBlock {
    pub commit: String,
    /// Committer time, seconds since the epoch
    pub timestamp: i64,
    /// Lines including their terminators; the file's last line may have none
    pub lines: Vec<String>,
}

impl CommitBlock {
    pub fn new(commit: impl Into<String>, timestamp: i64, lines: &[&str]) -> Self {
        Self {
            commit: commit.into(),
            timestamp,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// A tracked document together with its authorship blocks, in file order
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub blocks: Vec<CommitBlock>,
}

/// Identifies one physical line in one document's rewrite stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor {
    pub document: DocumentIndex,
    pub commit: usize,
    pub line: usize,
}

/// Which anchor of a commit an asset attaches to, and on which side of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Captured before the commit: goes before the commit's first-touched line
    Before,
    /// Captured at or after the commit: goes after the commit's last-touched line
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum Assignment {
    #[default]
    Unassigned,
    Assigned(DocumentIndex),
    Skipped,
}

impl Assignment {
    pub fn is_pending(&self) -> bool {
        matches!(self, Assignment::Unassigned)
    }
}

/// Everything remembered about one photo between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub filename: String,
    /// Absolute path, also the cache key
    pub location: String,
    #[serde(rename = "document")]
    pub assignment: Assignment,
    pub capture_epoch: i64,
    pub thumbnail: Vec<u8>,
}

impl AssetRecord {
    pub fn new(location: impl Into<String>, capture_epoch: i64, thumbnail: Vec<u8>) -> Self {
        let location = location.into();
        let filename = std::path::Path::new(&location)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.clone());
        Self {
            filename,
            location,
            assignment: Assignment::Unassigned,
            capture_epoch,
            thumbnail,
        }
    }
}
