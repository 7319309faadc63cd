// src/blame.rs

use crate::error::{Error, Result};
use crate::model::*;
use git2::{BlameOptions, Oid, Repository};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies per-line authorship for a document
pub trait AuthorshipSource {
    /// Blocks in file order. Lines keep their terminators, so concatenating
    /// them yields the document byte for byte
    fn blocks(&self, document: &Path) -> Result<Vec<CommitBlock>>;
}

/// Blames documents at `HEAD` of the repository containing them
pub struct GitBlame {
    repo: Repository,
    workdir: PathBuf,
    head: Oid,
}

impl GitBlame {
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::BareRepository(repo.path().to_path_buf()))?
            .canonicalize()?;
        let head = repo.head()?.peel_to_commit()?.id();
        debug!("Using repository at {}, HEAD {head}", workdir.display());
        Ok(Self { repo, workdir, head })
    }

    fn relative_path(&self, document: &Path) -> Result<PathBuf> {
        let absolute = document.canonicalize()?;
        absolute
            .strip_prefix(&self.workdir)
            .map(Path::to_path_buf)
            .map_err(|_| Error::OutsideWorkTree(absolute.clone()))
    }
}

impl AuthorshipSource for GitBlame {
    fn blocks(&self, document: &Path) -> Result<Vec<CommitBlock>> {
        let relative = self.relative_path(document)?;
        let head = self.repo.find_commit(self.head)?;

        // Lines come from the committed blob so they agree with the blame hunks
        let entry = head.tree()?.get_path(&relative)?;
        let blob = self.repo.find_blob(entry.id())?;
        let content = String::from_utf8_lossy(blob.content());
        let lines: Vec<&str> = content.split_inclusive('\n').collect();

        let mut opts = BlameOptions::new();
        opts.newest_commit(head.id());
        let blame = self.repo.blame_file(&relative, Some(&mut opts))?;

        let mut commit_times: HashMap<Oid, i64> = HashMap::new();
        let mut blocks = Vec::with_capacity(blame.len());
        for hunk in blame.iter() {
            let oid = hunk.final_commit_id();
            let timestamp = match commit_times.get(&oid) {
                Some(&ts) => ts,
                None => {
                    let ts = self.repo.find_commit(oid)?.time().seconds();
                    commit_times.insert(oid, ts);
                    ts
                }
            };

            // Blame line numbers are 1-based
            let start = hunk.final_start_line().saturating_sub(1).min(lines.len());
            let end = (start + hunk.lines_in_hunk()).min(lines.len());
            blocks.push(CommitBlock {
                commit: oid.to_string(),
                timestamp,
                lines: lines[start..end].iter().map(|l| l.to_string()).collect(),
            });
        }
        Ok(blocks)
    }
}

/// Blames every document. A document that cannot be blamed, e.g. one not yet
/// committed, is logged and left out; indices follow the returned order.
pub fn load_documents<A: AuthorshipSource>(source: &A, paths: &[PathBuf]) -> Vec<Document> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_message("Reading authorship history");

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        bar.inc(1);
        match source.blocks(path) {
            Ok(blocks) => {
                debug!("{}: {} blame blocks", path.display(), blocks.len());
                documents.push(Document { path: path.clone(), blocks });
            }
            Err(err) => warn!("couldn't read history of {}, leaving it out: {err}", path.display()),
        }
    }
    bar.finish_and_clear();
    documents
}
