// src/main.rs

use clap::Parser;
use commit_photos::blame::GitBlame;
use commit_photos::cli::Args;
use commit_photos::metadata::ExifReader;
use commit_photos::store::{AssetStore, SqliteStore};
use commit_photos::{run, Result, RunConfig, RunReport};
use log::{error, info};
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let start_time = Instant::now();

    match execute(&args) {
        Ok(report) => {
            for (path, text) in &report.previews {
                println!("CHANGES TO {}\n\n", path.display());
                print!("{text}");
            }
            info!(
                "Placed {} photos in {} documents, skipped {}, {} left for a later run.",
                report.placed, report.documents_rewritten, report.skipped, report.failed
            );
        }
        Err(e) => {
            error!("Error processing photos: {}", e);
            std::process::exit(1);
        }
    }

    info!("Total time: {:.2?}", start_time.elapsed());
}

fn execute(args: &Args) -> Result<RunReport> {
    let config = RunConfig::from(args);
    let mut store = AssetStore::new(SqliteStore::open(&args.cache)?);

    if args.reset_assignments {
        if config.dry_run {
            info!("Dry run: leaving cached assignments alone");
        } else {
            store.reset_assignments()?;
        }
    }

    let blame = GitBlame::discover(&config.document_dir)?;
    run(&config, &mut store, &blame, &ExifReader)
}
