//! Various utilities for dealing with GPS information.

use crate::{
    exif::{ExifData, IFDDataContents, IFDEntry, IFDTag, IFD},
    Error,
};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};

/// The map service that a located image is opened in. The coordinates are appended as
/// "<lat>,<long>".
pub const MAP_URL_BASE: &str = "http://www.google.com/maps/place/";

/// Convert latitude and longitude coordinates from degrees/minutes/seconds to decimal.
pub fn degrees_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60. + seconds / 3600.
}

/// The hemisphere reference stored next to a GPS coordinate. South and West are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    fn sign(self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.,
            Hemisphere::South | Hemisphere::West => -1.,
        }
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => Ok(Hemisphere::North),
            "S" => Ok(Hemisphere::South),
            "E" => Ok(Hemisphere::East),
            "W" => Ok(Hemisphere::West),
            other => Err(Error::InvalidReference(other.to_string())),
        }
    }
}

/// A coordinate in degrees, minutes and seconds, as stored in the GPSLatitude and GPSLongitude
/// tags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GPSCoordinate {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl GPSCoordinate {
    pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        GPSCoordinate {
            degrees,
            minutes,
            seconds,
        }
    }

    /// Signed decimal degrees. Values are not range checked: 95 degrees north stays 95.
    pub fn to_decimal(&self, hemisphere: Hemisphere) -> f64 {
        hemisphere.sign() * degrees_to_decimal(self.degrees, self.minutes, self.seconds)
    }

    fn from_entry(entry: &IFDEntry) -> Result<Self, Error> {
        let invalid = || Error::InvalidGpsField(entry.tagtype);

        let parts = entry
            .content
            .iter()
            .map(f64::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            &[d, m, s] if parts.iter().all(|x| x.is_finite()) => Ok(GPSCoordinate::new(d, m, s)),
            _ => Err(invalid()),
        }
    }
}

/// A latitude/longitude pair in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordinatePair {
    /// Read the four GPS tags out of the GPS IFD and convert them to decimal degrees.
    pub fn from_exif(exif: &ExifData) -> Result<Self, Error> {
        let gps = exif
            .subifd(IFDTag::GPSInfo)
            .ok_or(Error::MissingGpsField(IFDTag::GPSInfo))?;

        let latitude = read_coordinate(gps, IFDTag::GPSLatitude, IFDTag::GPSLatitudeRef)?;
        let longitude = read_coordinate(gps, IFDTag::GPSLongitude, IFDTag::GPSLongitudeRef)?;

        Ok(CoordinatePair {
            latitude,
            longitude,
        })
    }

    pub fn map_url(&self) -> String {
        format!("{}{}", MAP_URL_BASE, self)
    }
}

impl fmt::Display for CoordinatePair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

fn read_coordinate(gps: &IFD, value_tag: IFDTag, ref_tag: IFDTag) -> Result<f64, Error> {
    let value = gps.entry(value_tag).ok_or(Error::MissingGpsField(value_tag))?;
    let reference = gps.entry(ref_tag).ok_or(Error::MissingGpsField(ref_tag))?;

    let hemisphere = match reference.content.first() {
        Some(IFDDataContents::AsciiString(s)) => s.parse::<Hemisphere>()?,
        _ => return Err(Error::InvalidGpsField(ref_tag)),
    };

    Ok(GPSCoordinate::from_entry(value)?.to_decimal(hemisphere))
}
