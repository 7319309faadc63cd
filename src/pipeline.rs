// src/pipeline.rs

use crate::blame::{load_documents, AuthorshipSource};
use crate::config::RunConfig;
use crate::error::Result;
use crate::history::HistoryIndex;
use crate::matcher::{match_capture, MatchOutcome};
use crate::metadata::MetadataReader;
use crate::model::*;
use crate::plan::{render_reference, Fragment, InsertionPlan};
use crate::rewriter::{matches_blocks, rewrite, write_document};
use crate::store::{AssetStore, KeyValueStore, Lookup};
use crate::transfer::copy_asset;
use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const THUMBNAIL_SUFFIX: &str = ".thumb.jpg";

/// What a run did, or in dry-run mode would have done
#[derive(Debug, Default)]
pub struct RunReport {
    /// Photos spliced into a document
    pub placed: usize,
    /// Photos too far from every commit
    pub skipped: usize,
    /// Photos left for the next run because of an error
    pub failed: usize,
    pub documents_rewritten: usize,
    /// Reconstructed documents, filled in dry-run mode only
    pub previews: Vec<(PathBuf, String)>,
}

/// Sorted file names in `dir` accepted by `keep`
fn list_dir(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("couldn't read an entry of {}: {err}", dir.display());
                continue;
            }
        };
        // Follows symlinks; a dangling one is reported and passed over
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => continue,
            Err(err) => {
                warn!("couldn't stat {}: {err}", entry.path().display());
                continue;
            }
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if keep(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

pub fn list_documents(config: &RunConfig) -> Result<Vec<PathBuf>> {
    list_dir(&config.document_dir, |name| name.ends_with(&config.document_suffix))
}

pub fn list_assets(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let candidates = list_dir(&config.asset_dir, |name| {
        !name.starts_with('.') && name.ends_with(&config.asset_suffix) && !name.ends_with(THUMBNAIL_SUFFIX)
    })?;
    let Some(max_days) = config.max_age_days else {
        return Ok(candidates);
    };

    let now = Local::now();
    let mut fresh = Vec::with_capacity(candidates.len());
    for path in candidates {
        let modified: DateTime<Local> = match fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified.into(),
            Err(err) => {
                warn!("couldn't read the age of {}, skipping: {err}", path.display());
                continue;
            }
        };
        let age_days = (now - modified).num_seconds() as f64 / 86_400.0;
        if age_days > max_days {
            debug!("ignoring {}, {age_days:.1} days old", path.display());
            continue;
        }
        fresh.push(path);
    }
    Ok(fresh)
}

fn cache_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Cached records still waiting for a document, plus fresh records for new photos
fn load_pending<S: KeyValueStore, M: MetadataReader>(
    config: &RunConfig,
    store: &mut AssetStore<S>,
    reader: &M,
    paths: &[PathBuf],
    report: &mut RunReport,
) -> Result<Vec<AssetRecord>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_message("Reading photo metadata");

    let mut pending = Vec::new();
    for path in paths {
        bar.inc(1);
        let key = cache_key(path);
        match store.lookup(&key)? {
            Lookup::Found(record) if record.assignment.is_pending() => pending.push(record),
            Lookup::Found(record) => debug!("{key} already handled ({:?})", record.assignment),
            Lookup::NotCached | Lookup::Undecodable => {
                debug!("processing {key}");
                let meta = match reader.read(path) {
                    Ok(meta) => meta,
                    Err(err) => {
                        warn!("couldn't get full data for {key}, skipping: {err}");
                        report.failed += 1;
                        continue;
                    }
                };
                let record = AssetRecord::new(key, meta.capture_epoch, meta.thumbnail);
                if !config.dry_run {
                    store.save(&record)?;
                }
                pending.push(record);
            }
        }
    }
    bar.finish_and_clear();
    Ok(pending)
}

/// One pass over the photos and documents named by `config`.
///
/// Directories are listed and authorship history is read before anything is
/// mutated, so an unreadable directory aborts the run with the cache and
/// documents intact. Single documents or photos that fail are logged and left
/// for a later run.
pub fn run<S, A, M>(
    config: &RunConfig,
    store: &mut AssetStore<S>,
    authorship: &A,
    reader: &M,
) -> Result<RunReport>
where
    S: KeyValueStore,
    A: AuthorshipSource,
    M: MetadataReader,
{
    let mut report = RunReport::default();

    let document_paths = list_documents(config)?;
    let asset_paths = list_assets(config)?;
    let documents = load_documents(authorship, &document_paths);
    info!("Found {} documents and {} candidate photos", documents.len(), asset_paths.len());

    let pending = load_pending(config, store, reader, &asset_paths, &mut report)?;
    let index = HistoryIndex::build(&documents);

    let mut plan = InsertionPlan::new();
    let mut planned: HashMap<String, AssetRecord> = HashMap::new();

    for mut record in pending {
        match match_capture(&index, record.capture_epoch, config.max_gap_secs) {
            MatchOutcome::NoHistory => {
                warn!("No commit history to match {} against", record.location);
            }
            MatchOutcome::TooFar { gap, .. } => {
                info!("Skipping {}, it's {gap}s from the nearest commit", record.location);
                if !config.dry_run {
                    store.tag_skipped(&mut record)?;
                }
                report.skipped += 1;
            }
            MatchOutcome::Matched { anchor, side, timestamp } => {
                let commit = &documents[anchor.document].blocks[anchor.commit].commit;
                debug!(
                    "{} matches commit {commit} at {timestamp}, {side:?} {anchor:?}",
                    record.location
                );
                if !config.dry_run {
                    if let Err(err) = copy_asset(&record, &config.dest_dir) {
                        warn!("couldn't copy {}: {err}", record.location);
                        report.failed += 1;
                        continue;
                    }
                }
                let text = render_reference(&record.filename, &config.link_prefix, &config.label);
                plan.push(anchor, Fragment { text, side, asset: record.location.clone() });
                planned.insert(record.location.clone(), record);
            }
        }
    }

    if plan.is_empty() {
        return Ok(report);
    }
    info!("Placing {} photos", plan.fragment_count());

    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_message("Rewriting documents");
    for (document, doc) in documents.iter().enumerate() {
        bar.inc(1);
        let Some(text) = rewrite(document, &doc.blocks, &plan) else {
            continue;
        };
        let assets = plan.assets_for(document);

        let current = match fs::read_to_string(&doc.path) {
            Ok(current) => current,
            Err(err) => {
                warn!("couldn't read {}: {err}", doc.path.display());
                report.failed += assets.len();
                continue;
            }
        };
        if !matches_blocks(&current, &doc.blocks) {
            warn!("{} has uncommitted changes, commit them and run again", doc.path.display());
            report.failed += assets.len();
            continue;
        }

        if config.dry_run {
            report.placed += assets.len();
            report.previews.push((doc.path.clone(), text));
            continue;
        }

        if let Err(err) = write_document(&doc.path, &text) {
            warn!("couldn't write {}: {err}", doc.path.display());
            report.failed += assets.len();
            continue;
        }
        info!("Added {} photos to {}", assets.len(), doc.path.display());
        report.documents_rewritten += 1;

        for key in assets {
            if let Some(record) = planned.get_mut(key) {
                store.tag_assigned(record, document)?;
                report.placed += 1;
            }
        }
    }
    bar.finish_and_clear();

    Ok(report)
}
