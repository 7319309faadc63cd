// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Print changed documents to stdout instead of writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Directory of documents, inside a git working tree
    #[arg(long)]
    pub markdown_dir: PathBuf,

    /// Directory to import photos from, e.g. a camera SD card
    #[arg(long)]
    pub import_photo_dir: PathBuf,

    /// Directory to save photos and thumbnails into
    #[arg(long)]
    pub dest_photo_dir: PathBuf,

    /// Ignore photos whose files are more than this many days old
    #[arg(long)]
    pub ignore_past_age: Option<f64>,

    /// Prefix for photo links in the rendered markdown
    #[arg(long, default_value = "/img/archivalPhotos/")]
    pub photo_link_prefix: String,

    /// Alt text of the rendered thumbnail
    #[arg(long, default_value = "An archival photo")]
    pub photo_label: String,

    /// Suffix of documents to consider
    #[arg(long, default_value = ".page")]
    pub markdown_suffix: String,

    /// Your camera's image extension
    #[arg(long, default_value = ".JPG")]
    pub picture_suffix: String,

    /// SQLite file remembering processed photos
    #[arg(long, default_value = "exifCache.sqlite")]
    pub cache: PathBuf,

    /// Photos further than this from every commit are skipped, in seconds
    #[arg(long, default_value_t = 7200)]
    pub max_gap_secs: i64,

    /// Forget which documents photos were placed in before running
    #[arg(long)]
    pub reset_assignments: bool,
}
