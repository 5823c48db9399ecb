#![forbid(unsafe_code)]

pub mod browser;
pub mod config;
pub mod dispatch;
mod error;
pub mod exif;
pub mod image;
pub mod jfif;
pub mod parse;
pub mod pdf;
pub mod version;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{Error, Result};

use jfif::{JFIFMarkerCode, JFIFSegment};

#[derive(Debug)]
pub struct JPEGFile {
    pub file_size: usize,
    pub segments: Vec<JFIFSegment>,
}

impl JPEGFile {
    /// Walk the segments of a JPEG image, from the SOI marker up to the start of the scan data.
    pub fn parse(i: parse::Input) -> parse::Result<Self> {
        use nom::{bytes::complete::tag, error::context};

        let file_size = i.len();
        let soi = JFIFMarkerCode::SOI.as_bytes();
        context("Start of image", tag(&soi[..]))(i)?;

        let mut segments = Vec::new();
        let mut current_input = i;
        while !current_input.is_empty() {
            let (i, seg) = context("JFIF segment", JFIFSegment::parse)(current_input)?;
            current_input = i;

            let marker = seg.data().marker();
            segments.push(seg);
            if marker == JFIFMarkerCode::SOS || marker == JFIFMarkerCode::EOI {
                break;
            }
        }

        let file = JPEGFile {
            file_size,
            segments,
        };

        Ok((current_input, file))
    }

    /// The first Exif segment of the image, if there is one.
    pub fn into_exif(self) -> Option<exif::ExifData> {
        self.segments.into_iter().find_map(|s| match s {
            JFIFSegment::ExifSegment(data) => Some(data),
            _ => None,
        })
    }
}
