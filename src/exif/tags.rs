//! Provides the IFDTag enum, which specifies the IFD tags that the ExifData segment parser knows
//! by name.

use crate::{exif::TIFFByteAlignment, parse};
use derive_try_from_primitive::TryFromPrimitive;
use nom::error::context;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, TryFromPrimitive, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum IFDTag {
    // Catch-all tag for unknown entry types
    Unknown = 0xffff,

    // GPS tags
    // Taken from https://www.exiftool.org/TagNames/GPS.html
    GPSVersionID = 0x0000,
    GPSLatitudeRef = 0x0001,
    GPSLatitude = 0x0002,
    GPSLongitudeRef = 0x0003,
    GPSLongitude = 0x0004,
    GPSAltitudeRef = 0x0005,
    GPSAltitude = 0x0006,
    GPSTimeStamp = 0x0007,
    GPSSatellites = 0x0008,
    GPSStatus = 0x0009,
    GPSMeasureMode = 0x000a,
    GPSDOP = 0x000b,
    GPSSpeedRef = 0x000c,
    GPSSpeed = 0x000d,
    GPSTrackRef = 0x000e,
    GPSTrack = 0x000f,
    GPSImgDirectionRef = 0x0010,
    GPSImgDirection = 0x0011,
    GPSMapDatum = 0x0012,
    GPSProcessingMethod = 0x001b,
    GPSDateStamp = 0x001d,
    GPSHPositioningError = 0x001f,

    // Taken from https://www.exiftool.org/TagNames/EXIF.html
    ImageWidth = 0x0100,
    ImageLength = 0x0101,
    ImageDescription = 0x010e,
    Make = 0x010f,
    Model = 0x0110,
    Orientation = 0x0112,
    XResolution = 0x011a,
    YResolution = 0x011b,
    ResolutionUnit = 0x0128,
    Software = 0x0131,
    DateTime = 0x0132,

    Copyright = 0x8298,
    ExposureTime = 0x829a,
    FNumber = 0x829d,
    ExifOffset = 0x8769,
    GPSInfo = 0x8825,
    ISOSpeedRatings = 0x8827,

    ExifVersion = 0x9000,
    DateTimeOriginal = 0x9003,
    DateTimeDigitized = 0x9004,
    FocalLength = 0x920a,
    MakerNote = 0x927c,
    UserComment = 0x9286,

    ExifImageWidth = 0xa002,
    ExifImageHeight = 0xa003,
    ExifInteroperabilityOffset = 0xa005,
    LensModel = 0xa434,
}

impl IFDTag {
    /// Parse an IFD tag.
    pub fn parse(i: parse::Input, alignment: TIFFByteAlignment) -> parse::Result<Self> {
        use nom::{combinator::map_res, error::ErrorKind};

        let parser = map_res(
            |x| alignment.parse_u16(x),
            |x| Self::try_from(x).map_err(|_| ErrorKind::Alt),
        );

        context("IFDTag", parser)(i)
    }

    /// Parse an IFD tag. If the tag type is unknown, replace it with `IFDTag::Unknown`.
    pub fn parse_unknown(i: parse::Input, alignment: TIFFByteAlignment) -> parse::Result<Self> {
        let (i, tag) = context("IFDTag", |x| alignment.parse_u16(x))(i)?;
        Ok((i, Self::try_from(tag).unwrap_or(IFDTag::Unknown)))
    }

    /// Returns `true` for tags whose value is the offset of another IFD.
    pub fn is_subifd_pointer(self) -> bool {
        matches!(self, IFDTag::ExifOffset | IFDTag::GPSInfo)
    }
}
