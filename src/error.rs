// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{} carries no capture time", .0.display())]
    MissingCaptureTime(PathBuf),

    #[error("invalid capture time '{0}'")]
    InvalidCaptureTime(String),

    #[error("{} is not inside the repository working tree", .0.display())]
    OutsideWorkTree(PathBuf),

    #[error("repository at {} has no working tree", .0.display())]
    BareRepository(PathBuf),
}
