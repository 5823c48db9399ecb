//! Locating an image from the GPS tags in its Exif data.

use crate::{
    exif::{gps::CoordinatePair, ExifData, IFDEntry},
    jfif::JFIFMarkerCode,
    parse, Error, JPEGFile, Result,
};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub exif_version: Option<String>,
    pub coordinates: CoordinatePair,
    pub map_url: String,
    /// Every Exif entry of the image. Only filled in when the tags were asked for.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<IFDEntry>,
}

/// Find the Exif data in an image. JPEG files are walked segment by segment; anything else is
/// searched for an embedded Exif block.
pub fn read_exif(data: &[u8]) -> Result<ExifData> {
    if data.starts_with(&JFIFMarkerCode::SOI.as_bytes()) {
        let (_, img) = JPEGFile::parse(data)
            .map_err(|e| Error::Parse(parse::pretty_error_message(data, e)))?;
        debug!(
            segments = img.segments.len(),
            bytes = img.file_size,
            "Parsed JPEG segments"
        );
        img.into_exif().ok_or(Error::NoExif)
    } else {
        debug!("Not a JPEG, searching for an embedded Exif block");
        ExifData::search(data).ok_or(Error::NoExif)
    }
}

/// Read the image at `path` and work out where it was taken.
pub fn locate(path: &Path, list_tags: bool) -> Result<ImageReport> {
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    let exif = read_exif(&data)?;
    let exif_version = exif.exif_version();
    match &exif_version {
        Some(v) => info!("Image contains EXIF (version {}) data.", v),
        None => info!("Image contains EXIF data."),
    }

    let coordinates = CoordinatePair::from_exif(&exif)?;
    info!(
        latitude = coordinates.latitude,
        longitude = coordinates.longitude,
        "Found GPS coordinates"
    );

    let entries = if list_tags {
        exif.collect_ifd_entries()
    } else {
        Vec::new()
    };

    Ok(ImageReport {
        exif_version,
        map_url: coordinates.map_url(),
        coordinates,
        entries,
    })
}
