//! Traits and functions for walking the segments of a JPEG image.

mod marker_codes;

pub use marker_codes::JFIFMarkerCode;
use crate::{exif::ExifData, parse};
use nom::error::context;
use std::fmt;

pub trait ParseableSegment {
    /// Returns `true` if we believe that this `ParseableSegment` can parse this segment of the
    /// input. Otherwise, returns `false`.
    fn can_parse_segment(i: parse::Input) -> bool
    where
        Self: Sized;

    /// Returns the segment marker for the parsed segment.
    fn marker(&self) -> JFIFMarkerCode;

    /// Returns the size (in bytes) of the JFIF segment's data section. If the segment doesn't have
    /// a data section, this function should return `None`.
    fn data_size(&self) -> Option<usize>;

    /// Returns the full size of the JFIF segment, including the size bytes and the magic bytes at
    /// the start of the segment.
    fn segment_size(&self) -> usize {
        let marker = self.marker();
        match self.data_size() {
            _ if marker.is_standalone() => 2,

            // The scan data that follows SOS is stored without the two size bytes
            Some(sz) if marker == JFIFMarkerCode::SOS => sz + 2,

            None => 4,
            Some(sz) => sz + 4,
        }
    }

    /// Parse the data bytes of the JFIF segment, returning a new instance of the
    /// `ParseableSegment` implementor. `magic` contains the marker bytes for the segment, and
    /// `size` is the size of the data section.
    fn parse_data_bytes(
        i: parse::Input,
        magic: JFIFMarkerCode,
        data_size: usize,
    ) -> parse::Result<Self>
    where
        Self: Sized;

    /// Parse the JFIF segment starting from the segment marker.
    fn parse(i: parse::Input) -> parse::Result<Self>
    where
        Self: Sized,
    {
        use nom::{bytes::complete::take, combinator::verify, number::complete::be_u16};

        let (i, magic) = context("Segment magic", JFIFMarkerCode::parse)(i)?;

        let (i, data, data_size) = match magic {
            // Standalone markers don't have any data associated with them.
            m if m.is_standalone() => (i, &i[0..0], 0),

            // Everything after SOS is entropy-coded scan data, restart markers and finally EOI.
            // None of it is metadata, so the rest of the file is swallowed as the SOS data.
            JFIFMarkerCode::SOS => {
                let data_size = i.len();
                let (i, data) = context("SOS data", take(data_size))(i)?;
                (i, data, data_size)
            }

            // For all remaining markers, the next two bytes hold the size of the data section.
            // The stored size counts those two bytes as well, so it must always be >= 2.
            _ => {
                let mut parser = context("Data section size", verify(be_u16, |&x| x >= 2));
                let (i, data_size) = parser(i)?;
                let data_size = (data_size - 2) as usize;

                let (i, data) = context("Data section", take(data_size))(i)?;
                (i, data, data_size)
            }
        };

        let (_, result) = context("Data section parser", |x| {
            Self::parse_data_bytes(x, magic, data_size)
        })(data)?;
        Ok((i, result))
    }
}

/// A type implementing the `ParseableSegment` trait that can be used to match an arbitrary JFIF
/// segment. Only the marker and size are kept; the payload is of no interest here.
#[derive(Debug)]
pub struct UnknownJFIFSegment {
    pub magic: JFIFMarkerCode,
    pub data_size: usize,
}

impl ParseableSegment for UnknownJFIFSegment {
    fn can_parse_segment(i: parse::Input) -> bool {
        JFIFMarkerCode::parse(i).is_ok()
    }

    fn marker(&self) -> JFIFMarkerCode {
        self.magic
    }

    fn data_size(&self) -> Option<usize> {
        Some(self.data_size)
    }

    fn parse_data_bytes(
        i: parse::Input,
        magic: JFIFMarkerCode,
        data_size: usize,
    ) -> parse::Result<Self> {
        use nom::bytes::complete::take;

        let (i, _) = context("UnknownJFIFSegment data bytes", take(data_size))(i)?;
        Ok((i, UnknownJFIFSegment { magic, data_size }))
    }
}

/// An enum that wraps around the segment types that we can detect in a JPEG image.
pub enum JFIFSegment {
    ExifSegment(ExifData),
    Unknown(UnknownJFIFSegment),
}

impl fmt::Debug for JFIFSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JFIFSegment::ExifSegment(_) => write!(f, "ExifSegment"),
            JFIFSegment::Unknown(seg) => write!(f, "Unknown segment ({:?})", seg.magic),
        }
    }
}

impl JFIFSegment {
    pub fn parse(i: parse::Input) -> parse::Result<Self> {
        let (_, magic) = context("Segment magic", JFIFMarkerCode::parse)(i)?;

        // Exif lives in an APP1 segment, but so does XMP. Only claim the segment as Exif when its
        // data section starts with the Exif header.
        if magic == JFIFMarkerCode::APPm(0x01) && ExifData::can_parse_segment(i) {
            let (i, data) = context("JFIFSegment::ExifSegment", ExifData::parse)(i)?;
            Ok((i, JFIFSegment::ExifSegment(data)))
        } else {
            let (i, data) = context("JFIFSegment::Unknown", UnknownJFIFSegment::parse)(i)?;
            Ok((i, JFIFSegment::Unknown(data)))
        }
    }

    pub fn data(&self) -> &dyn ParseableSegment {
        match self {
            JFIFSegment::ExifSegment(data) => data,
            JFIFSegment::Unknown(data) => data,
        }
    }
}
