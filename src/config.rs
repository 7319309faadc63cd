// src/config.rs

use crate::cli::Args;
use crate::matcher::MAX_GAP_SECS;
use std::path::PathBuf;

/// Settings for one run of the pipeline
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dry_run: bool,
    pub document_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Photos whose files are older than this many days are ignored
    pub max_age_days: Option<f64>,
    pub link_prefix: String,
    pub label: String,
    pub document_suffix: String,
    pub asset_suffix: String,
    pub max_gap_secs: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            document_dir: PathBuf::from("."),
            asset_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("."),
            max_age_days: None,
            link_prefix: "/img/archivalPhotos/".to_string(),
            label: "An archival photo".to_string(),
            document_suffix: ".page".to_string(),
            asset_suffix: ".JPG".to_string(),
            max_gap_secs: MAX_GAP_SECS,
        }
    }
}

impl From<&Args> for RunConfig {
    fn from(args: &Args) -> Self {
        Self {
            dry_run: args.dry_run,
            document_dir: args.markdown_dir.clone(),
            asset_dir: args.import_photo_dir.clone(),
            dest_dir: args.dest_photo_dir.clone(),
            max_age_days: args.ignore_past_age,
            link_prefix: args.photo_link_prefix.clone(),
            label: args.photo_label.clone(),
            document_suffix: args.markdown_suffix.clone(),
            asset_suffix: args.picture_suffix.clone(),
            max_gap_secs: args.max_gap_secs,
        }
    }
}
