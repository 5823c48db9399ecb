//! Defines the `JFIFMarkerCode` type. Only the markers that change how a segment is walked get a
//! variant of their own; every other marker is carried through as `Other` with its low byte.

use crate::impl_parse_for_enum;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Marker codes for JFIF segments. See ISO/IEC 10918-1: 1993(E), p. 36 for the full table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum JFIFMarkerCode {
    SOI,      // 0xFFD8: Start of image
    EOI,      // 0xFFD9: End of image
    SOS,      // 0xFFDA: Start of scan
    RSTm(u8), // 0xFFD0 - 0xFFD7: Restart with modulo 8 count "m"
    APPm(u8), // 0xFFE0 - 0xFFEF: Reserved for application segments
    COM,      // 0xFFFE: Comment

    // Frame, table and reserved markers. All of them carry a size-prefixed data section.
    Other(u8),
}

// Define JFIFMarkerCode::parse(i: parse::Input) -> parse::Result by parsing the marker code from a
// 16-bit integer.
impl_parse_for_enum!(JFIFMarkerCode, be_u16);

impl JFIFMarkerCode {
    /// Returns `true` for markers that stand alone, without a size field or data section.
    pub fn is_standalone(&self) -> bool {
        matches!(
            self,
            JFIFMarkerCode::SOI | JFIFMarkerCode::EOI | JFIFMarkerCode::RSTm(_)
        )
    }

    pub fn as_bytes(self) -> [u8; 2] {
        u16::from(self).to_be_bytes()
    }
}

impl TryFrom<u16> for JFIFMarkerCode {
    type Error = &'static str;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        let result = match code {
            0xFFD8 => JFIFMarkerCode::SOI,
            0xFFD9 => JFIFMarkerCode::EOI,
            0xFFDA => JFIFMarkerCode::SOS,
            0xFFFE => JFIFMarkerCode::COM,
            0xFFD0..=0xFFD7 => JFIFMarkerCode::RSTm((code & 0x000F) as u8),
            0xFFE0..=0xFFEF => JFIFMarkerCode::APPm((code & 0x000F) as u8),

            // 0xFF00 is a stuffed byte and 0xFFFF is fill, neither of which starts a segment
            0xFF01..=0xFFFE => JFIFMarkerCode::Other((code & 0x00FF) as u8),
            _ => return Err("Invalid marker code (code must be between 0xFF01 and 0xFFFE)"),
        };

        Ok(result)
    }
}

impl From<JFIFMarkerCode> for u16 {
    fn from(marker: JFIFMarkerCode) -> Self {
        match marker {
            JFIFMarkerCode::SOI => 0xFFD8,
            JFIFMarkerCode::EOI => 0xFFD9,
            JFIFMarkerCode::SOS => 0xFFDA,
            JFIFMarkerCode::COM => 0xFFFE,
            JFIFMarkerCode::RSTm(code) => 0xFFD0 | (code as u16),
            JFIFMarkerCode::APPm(code) => 0xFFE0 | (code as u16),
            JFIFMarkerCode::Other(code) => 0xFF00 | (code as u16),
        }
    }
}

#[cfg(test)]
mod test {
    use super::JFIFMarkerCode;
    use std::convert::TryFrom;

    #[test]
    fn test_to_and_from_u16() {
        // Every code between 0xFF01 and 0xFFFE maps to a marker, and maps back to itself.
        for code in 0..=0xFFFF {
            let code = code as u16;
            let in_valid_range = (0xFF01..=0xFFFE).contains(&code);
            match JFIFMarkerCode::try_from(code) {
                Ok(marker) => {
                    assert!(in_valid_range);
                    assert_eq!(code, u16::from(marker));
                }
                Err(_) => assert!(!in_valid_range),
            }
        }
    }

    #[test]
    fn test_application_segments_keep_their_index() {
        assert_eq!(JFIFMarkerCode::try_from(0xFFE1u16), Ok(JFIFMarkerCode::APPm(1)));
        assert_eq!(JFIFMarkerCode::APPm(1).as_bytes(), [0xFF, 0xE1]);
        assert_eq!(JFIFMarkerCode::try_from(0xFFDBu16), Ok(JFIFMarkerCode::Other(0xDB)));
    }

    #[test]
    fn test_standalone_markers() {
        assert!(JFIFMarkerCode::SOI.is_standalone());
        assert!(JFIFMarkerCode::RSTm(3).is_standalone());
        assert!(!JFIFMarkerCode::SOS.is_standalone());
        assert!(!JFIFMarkerCode::APPm(1).is_standalone());
    }
}
