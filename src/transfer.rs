// src/transfer.rs

use crate::model::AssetRecord;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn thumbnail_name(filename: &str) -> String {
    format!("{filename}.thumb.jpg")
}

/// Copies the full-size photo and writes its thumbnail into `dest_dir`.
/// Files already present are left alone.
pub fn copy_asset(record: &AssetRecord, dest_dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dest_dir)?;

    let full = dest_dir.join(&record.filename);
    if !full.exists() {
        info!("copying from {} to {}", record.location, full.display());
        fs::copy(&record.location, &full)?;
    }

    let thumb = dest_dir.join(thumbnail_name(&record.filename));
    if !thumb.exists() {
        fs::write(&thumb, &record.thumbnail)?;
    }

    Ok((full, thumb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_once_and_keeps_existing_files() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let photo = src.path().join("P1.JPG");
        fs::write(&photo, b"full size").unwrap();

        let record = AssetRecord::new(photo.to_string_lossy(), 0, b"thumb".to_vec());
        let (full, thumb) = copy_asset(&record, &dest.path().join("img")).unwrap();
        assert_eq!(fs::read(&full).unwrap(), b"full size");
        assert_eq!(fs::read(&thumb).unwrap(), b"thumb");
        assert!(thumb.ends_with("P1.JPG.thumb.jpg"));

        fs::write(&full, b"edited").unwrap();
        copy_asset(&record, &dest.path().join("img")).unwrap();
        assert_eq!(fs::read(&full).unwrap(), b"edited");
    }
}
