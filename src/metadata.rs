// src/metadata.rs

use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use exif::{Exif, In, Tag, Value};
use image::{DynamicImage, ImageOutputFormat};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Layout of EXIF date-time fields
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const THUMBNAIL_WIDTH: u32 = 160;
const THUMBNAIL_HEIGHT: u32 = 120;
const THUMBNAIL_QUALITY: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetadata {
    pub capture_epoch: i64,
    pub thumbnail: Vec<u8>,
}

/// Reads capture time and a thumbnail for a photo
pub trait MetadataReader {
    fn read(&self, path: &Path) -> Result<CaptureMetadata>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> Result<CaptureMetadata> {
        let file = File::open(path)?;
        let exif = exif::Reader::new().read_from_container(&mut BufReader::new(file))?;

        let raw = ascii_field(&exif, Tag::DateTime)
            .or_else(|| ascii_field(&exif, Tag::DateTimeOriginal))
            .ok_or_else(|| Error::MissingCaptureTime(path.to_path_buf()))?;
        let capture_epoch = parse_capture_time(&raw)?;

        let thumbnail = match embedded_thumbnail(&exif) {
            Some(bytes) => bytes.to_vec(),
            None => generate_thumbnail(path)?,
        };

        Ok(CaptureMetadata { capture_epoch, thumbnail })
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => values
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// The JPEG thumbnail stored in IFD1, if the camera wrote one
fn embedded_thumbnail(exif: &Exif) -> Option<&[u8]> {
    let offset = exif.get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?.value.get_uint(0)? as usize;
    let len = exif.get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?.value.get_uint(0)? as usize;
    exif.buf().get(offset..offset.checked_add(len)?)
}

fn generate_thumbnail(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path)?;
    let small = DynamicImage::ImageRgb8(img.thumbnail(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT).to_rgb8());
    let mut bytes = Vec::new();
    small.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(THUMBNAIL_QUALITY))?;
    Ok(bytes)
}

pub fn parse_naive(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT)
        .map_err(|_| Error::InvalidCaptureTime(value.to_string()))
}

/// EXIF times carry no zone; they are read as local time like the camera clock
pub fn parse_capture_time(value: &str) -> Result<i64> {
    let naive = parse_naive(value)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| Error::InvalidCaptureTime(value.to_string()))
}
