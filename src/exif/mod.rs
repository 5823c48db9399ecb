//! Parsing for the Exif data structure.

pub mod gps;
mod tags;

pub use tags::IFDTag;

use crate::{
    impl_parse_for_enum,
    jfif::{JFIFMarkerCode, ParseableSegment},
    parse,
};
use derive_try_from_primitive::TryFromPrimitive;
use nom::{
    bytes::complete::{tag, take},
    error::context,
    sequence::tuple,
    Offset,
};
use serde::{ser::SerializeTuple, Deserialize, Serialize, Serializer};
use std::{collections::HashSet, convert::TryFrom};

/// Sub-IFD pointers are followed at most this many levels deep.
const MAX_IFD_DEPTH: usize = 4;

/// IFD0 may link to IFD1 (the thumbnail IFD) and, in broken files, onwards. Only this many IFDs
/// of the chain are read.
const MAX_IFD_CHAIN: usize = 4;

/// The Exif data structure containing all of the metadata specified in
/// an Exif section.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExifData {
    pub data_size: usize,
    pub tiff_header: TIFFHeader,
    pub ifds: Vec<IFD>,
}

impl ExifData {
    const MARKER: JFIFMarkerCode = JFIFMarkerCode::APPm(0x01);
    const HEADER: &'static [u8] = b"Exif\x00\x00";

    pub fn collect_ifd_entries(&self) -> Vec<IFDEntry> {
        let mut entries = Vec::new();
        for ifd in self.ifds.iter() {
            entries.append(&mut collect_ifd_entries(ifd))
        }
        entries
    }

    /// Find the first entry with the given tag, looking through every IFD and sub-IFD.
    pub fn find_entry(&self, tagtype: IFDTag) -> Option<&IFDEntry> {
        self.ifds.iter().find_map(|ifd| ifd.find_entry(tagtype))
    }

    /// Find the sub-IFD that was reached through the given pointer tag, e.g. `IFDTag::GPSInfo`
    /// for the GPS IFD.
    pub fn subifd(&self, pointer: IFDTag) -> Option<&IFD> {
        self.ifds.iter().find_map(|ifd| ifd.find_subifd(pointer))
    }

    /// The Exif version, as stored in the ExifVersion tag (e.g. "0232").
    pub fn exif_version(&self) -> Option<String> {
        let entry = self.find_entry(IFDTag::ExifVersion)?;
        match entry.content.first()? {
            IFDDataContents::Undefined(x) => Some(String::from_utf8_lossy(x).into_owned()),
            IFDDataContents::AsciiString(x) => Some(x.clone()),
            _ => None,
        }
    }

    /// Look for an Exif block anywhere in `i`. This is how Exif data is found in containers that
    /// we don't walk segment by segment, such as BMP files. The first occurrence of the Exif
    /// header that is followed by a valid TIFF structure wins.
    pub fn search(i: parse::Input) -> Option<Self> {
        let mut start = 0;
        while let Some(pos) = i[start..]
            .windows(Self::HEADER.len())
            .position(|w| w == Self::HEADER)
        {
            let candidate = &i[start + pos..];
            if let Ok((_, exif)) = Self::parse_data_bytes(candidate, Self::MARKER, candidate.len())
            {
                return Some(exif);
            }
            start += pos + 1;
        }
        None
    }

    /// Verify that the data section contains the correct header bytes.
    fn parse_data_bytes_header(i: parse::Input) -> parse::Result<&[u8]> {
        context("Exif data section header", tag(Self::HEADER))(i)
    }
}

impl ParseableSegment for ExifData {
    fn can_parse_segment(i: parse::Input) -> bool {
        use nom::number::complete::be_u16;

        // We should be able to parse this segment if the first few bytes match the following
        // pattern:
        //
        //      APP1 header + 2 size bytes + "Exif\x00\x00"
        //
        let marker = Self::MARKER.as_bytes();
        let mut parser = tuple((tag(&marker[..]), be_u16, Self::parse_data_bytes_header));
        parser(i).is_ok()
    }

    fn marker(&self) -> JFIFMarkerCode {
        Self::MARKER
    }

    fn data_size(&self) -> Option<usize> {
        Some(self.data_size)
    }

    fn parse_data_bytes(
        i: parse::Input,
        _magic: JFIFMarkerCode,
        data_size: usize,
    ) -> parse::Result<Self> {
        let (i, _) = Self::parse_data_bytes_header(i)?;

        // Every offset inside the TIFF structure is relative to the start of the TIFF header
        let tiff = i;
        let (_, tiff_header) = context("TIFF header", TIFFHeader::parse)(tiff)?;
        let alignment = tiff_header.alignment;

        // Every IFD is read at most once, however many pointers lead to it
        let mut visited = HashSet::new();
        let mut ifds = Vec::new();
        let mut next_offset = Some(tiff_header.initial_offset);
        while let Some(offset) = next_offset {
            if ifds.len() == MAX_IFD_CHAIN || !visited.insert(offset) {
                break;
            }
            let ifd_input = parse::slice_from(tiff, offset as usize)?;
            let (_, ifd) = context("IFD", |x| {
                IFD::parse(x, tiff, alignment, 0, &mut visited)
            })(ifd_input)?;
            next_offset = ifd.offset_to_next;
            ifds.push(ifd);
        }

        let exif_data = ExifData {
            data_size,
            tiff_header,
            ifds,
        };

        Ok((&tiff[tiff.len()..], exif_data))
    }
}

/// TIFF header used within the Exif data structure to specify its layout.
#[derive(Debug, Serialize, Deserialize)]
pub struct TIFFHeader {
    pub alignment: TIFFByteAlignment,
    pub initial_offset: u32,
}

impl TIFFHeader {
    pub fn parse(i: parse::Input) -> parse::Result<Self> {
        use nom::combinator::verify;

        let (i, alignment) = context("Byte alignment", TIFFByteAlignment::parse)(i)?;
        let (i, _) = context(
            "Alignment check",
            verify(|x| alignment.parse_u16(x), |&x| x == 0x002a),
        )(i)?;
        let (i, initial_offset) = context("Initial offset", |x| alignment.parse_u32(x))(i)?;

        Ok((
            i,
            TIFFHeader {
                alignment,
                initial_offset,
            },
        ))
    }
}

/// Two-byte tag representing the byte alignment for the TIFF data.
#[derive(Debug, Clone, Copy, TryFromPrimitive, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum TIFFByteAlignment {
    LittleEndian = 0x4949, // "II" = Intel-type byte alignment
    BigEndian = 0x4d4d,    // "MM" = Motorola-type byte alignment
}

macro_rules! TIFFByteAlignment_parse_numeric {
    ($fn_name: ident, $type: ident, $le_number_parser: ident, $be_number_parser: ident) => {
        impl TIFFByteAlignment {
            pub fn $fn_name<'a>(&self, i: parse::Input<'a>) -> parse::Result<'a, $type> {
                use nom::number::complete::{$be_number_parser, $le_number_parser};
                match self {
                    TIFFByteAlignment::LittleEndian => $le_number_parser(i),
                    TIFFByteAlignment::BigEndian => $be_number_parser(i),
                }
            }
        }
    };
}

impl_parse_for_enum!(TIFFByteAlignment, be_u16);
TIFFByteAlignment_parse_numeric!(parse_u8, u8, le_u8, be_u8);
TIFFByteAlignment_parse_numeric!(parse_i8, i8, le_i8, be_i8);
TIFFByteAlignment_parse_numeric!(parse_u16, u16, le_u16, be_u16);
TIFFByteAlignment_parse_numeric!(parse_i16, i16, le_i16, be_i16);
TIFFByteAlignment_parse_numeric!(parse_u32, u32, le_u32, be_u32);
TIFFByteAlignment_parse_numeric!(parse_i32, i32, le_i32, be_i32);
TIFFByteAlignment_parse_numeric!(parse_f32, f32, le_f32, be_f32);
TIFFByteAlignment_parse_numeric!(parse_f64, f64, le_f64, be_f64);

/// Encapsulates an IFD (Image File Directory) in the image metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct IFD {
    pub num_entries: u16,
    pub entries: Vec<IFDEntry>,
    pub subifds: Vec<SubIFD>,
    pub offset_to_next: Option<u32>,
}

/// An IFD that was reached through a pointer tag (ExifOffset or GPSInfo) of its parent.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubIFD {
    pub pointer: IFDTag,
    pub ifd: Box<IFD>,
}

impl IFD {
    pub fn parse<'a>(
        i: parse::Input<'a>,
        original_input: parse::Input<'a>,
        alignment: TIFFByteAlignment,
        depth: usize,
        visited: &mut HashSet<u32>,
    ) -> parse::Result<'a, Self> {
        let (i, num_entries) = context("Number of IFD entries", |x| alignment.parse_u16(x))(i)?;
        let mut entries = Vec::with_capacity(num_entries as usize);
        let mut current_input = i;

        for _ in 0..num_entries {
            let (next_i, entry) = context("IFD entry", |i| {
                IFDEntry::parse(i, original_input, alignment)
            })(current_input)?;
            current_input = next_i;
            entries.push(entry);
        }

        let i = current_input;
        let (i, offset_to_next) = context("Offset to next IFD", |x| alignment.parse_u32(x))(i)?;
        let offset_to_next = if offset_to_next == 0 {
            None
        } else {
            Some(offset_to_next)
        };

        // Read the sub-IFDs that the pointer tags of this IFD refer to. Only the first pointer
        // of each kind is followed, and offsets that were already read are skipped.
        let mut subifds: Vec<SubIFD> = Vec::new();
        if depth < MAX_IFD_DEPTH {
            for e in entries.iter().filter(|e| e.tagtype.is_subifd_pointer()) {
                if subifds.iter().any(|s| s.pointer == e.tagtype) {
                    continue;
                }
                let offset = match e.content.first() {
                    Some(IFDDataContents::UnsignedLong(offset)) => *offset,
                    _ => continue,
                };
                if !visited.insert(offset) {
                    continue;
                }

                let subifd_input = parse::slice_from(original_input, offset as usize)?;
                let (_, subifd) = context("Sub-IFD", |x| {
                    IFD::parse(x, original_input, alignment, depth + 1, visited)
                })(subifd_input)?;
                subifds.push(SubIFD {
                    pointer: e.tagtype,
                    ifd: Box::new(subifd),
                });
            }
        }

        let ifd = IFD {
            num_entries,
            entries,
            subifds,
            offset_to_next,
        };
        Ok((i, ifd))
    }

    /// Look up an entry in this IFD only, without descending into sub-IFDs.
    pub fn entry(&self, tagtype: IFDTag) -> Option<&IFDEntry> {
        self.entries.iter().find(|e| e.tagtype == tagtype)
    }

    fn find_entry(&self, tagtype: IFDTag) -> Option<&IFDEntry> {
        self.entry(tagtype)
            .or_else(|| self.subifds.iter().find_map(|s| s.ifd.find_entry(tagtype)))
    }

    fn find_subifd(&self, pointer: IFDTag) -> Option<&IFD> {
        self.subifds.iter().find_map(|s| {
            if s.pointer == pointer {
                Some(&*s.ifd)
            } else {
                s.ifd.find_subifd(pointer)
            }
        })
    }
}

/// Recursively crawl an IFD and all linked IFDs to retrieve all of the `IFDEntry` instances they
/// contain and put them into a single `Vec`.
pub fn collect_ifd_entries(ifd: &IFD) -> Vec<IFDEntry> {
    let mut entries = ifd.entries.clone();
    for sub_ifd in ifd.subifds.iter() {
        entries.append(&mut collect_ifd_entries(&sub_ifd.ifd))
    }

    entries
}

/// Represents a single IFD (Image File Directory) entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IFDEntry {
    pub tagtype: IFDTag,
    pub data_format: IFDDataFormat,
    pub n_components: u32,
    pub content_offset: u32,
    pub content: Vec<IFDDataContents>,
}

impl IFDEntry {
    pub fn parse<'a>(
        i: parse::Input<'a>,
        original_input: parse::Input<'a>,
        alignment: TIFFByteAlignment,
    ) -> parse::Result<'a, Self> {
        let (i, (tagtype, data_format, n_components, value_field)) = tuple((
            context("IFD tag", |x| IFDTag::parse_unknown(x, alignment)),
            context("Data format", |x| IFDDataFormat::parse(x, alignment)),
            context("Number of components", |x| alignment.parse_u32(x)),
            context("IFD entry value", take(4usize)),
        ))(i)?;

        let content_size = data_format.bytes_per_component() * (n_components as usize);

        // If the total data size is <= 4 bytes, then the data is stored within the value field.
        // Otherwise, the value field holds an offset, and we have to extract the value by visiting
        // that offset.
        let mut parser = context("IFD entry contents", |x| {
            IFDDataContents::parse(x, data_format, n_components, alignment)
        });
        let (content_offset, content) = if content_size <= 4 {
            let (_, content) = parser(value_field)?;
            (original_input.offset(value_field) as u32, content)
        } else {
            let (_, offset) = context("IFD entry offset", |x| alignment.parse_u32(x))(value_field)?;
            let (_, content) = parser(parse::slice_from(original_input, offset as usize)?)?;
            (offset, content)
        };

        Ok((
            i,
            IFDEntry {
                tagtype,
                data_format,
                n_components,
                content_offset,
                content,
            },
        ))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize)]
#[repr(u16)]
pub enum IFDDataFormat {
    UnsignedByte = 1,
    AsciiString = 2,
    UnsignedShort = 3,
    UnsignedLong = 4,
    UnsignedRational = 5,
    SignedByte = 6,
    Undefined = 7,
    SignedShort = 8,
    SignedLong = 9,
    SignedRational = 10,
    SingleFloat = 11,
    DoubleFloat = 12,
    // Offset of another IFD; some writers use it for the ExifOffset and GPSInfo pointers
    IFDOffset = 13,
}

impl IFDDataFormat {
    pub fn parse(i: parse::Input, alignment: TIFFByteAlignment) -> parse::Result<Self> {
        use nom::{combinator::map_res, error::ErrorKind};

        let parser = map_res(
            |x| alignment.parse_u16(x),
            |x| Self::try_from(x).map_err(|_| ErrorKind::Alt),
        );
        context("IFD Data Format", parser)(i)
    }

    pub fn bytes_per_component(&self) -> usize {
        match self {
            IFDDataFormat::UnsignedByte => 1,
            IFDDataFormat::AsciiString => 1,
            IFDDataFormat::UnsignedShort => 2,
            IFDDataFormat::UnsignedLong => 4,
            IFDDataFormat::UnsignedRational => 8,
            IFDDataFormat::SignedByte => 1,
            IFDDataFormat::Undefined => 1,
            IFDDataFormat::SignedShort => 2,
            IFDDataFormat::SignedLong => 4,
            IFDDataFormat::SignedRational => 8,
            IFDDataFormat::SingleFloat => 4,
            IFDDataFormat::DoubleFloat => 8,
            IFDDataFormat::IFDOffset => 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum IFDDataContents {
    UnsignedByte(u8),
    AsciiString(String),
    UnsignedShort(u16),
    UnsignedLong(u32),
    UnsignedRational(u32, u32),
    SignedByte(i8),
    Undefined(Vec<u8>),
    SignedShort(i16),
    SignedLong(i32),
    SignedRational(i32, i32),
    SingleFloat(f32),
    DoubleFloat(f64),
}

impl IFDDataContents {
    pub fn parse(
        i: parse::Input,
        format: IFDDataFormat,
        n_components: u32,
        alignment: TIFFByteAlignment,
    ) -> parse::Result<Vec<Self>> {
        match format {
            IFDDataFormat::AsciiString | IFDDataFormat::Undefined => {
                // For both of these formats, n_components refers to the number of characters/bytes
                // in the data type, rather than the number of instances of the data type that
                // exist. Therefore, the logic for parsing these types is equivalent to the logic
                // for parsing a single instance of them.
                let (i, result) = Self::parse_one(i, format, n_components, alignment)?;
                Ok((i, vec![result]))
            }
            _ => {
                // For all other formats, n_components refers to the number of instances of the
                // type that exist. GPS latitude and longitude, for instance, are stored as three
                // rationals.
                let mut contents = Vec::new();
                let mut i = i;
                for _ in 0..n_components {
                    let (next_i, res) = Self::parse_one(i, format, n_components, alignment)?;
                    i = next_i;
                    contents.push(res);
                }
                Ok((i, contents))
            }
        }
    }

    /// Parse a single value of the input data format.
    fn parse_one(
        i: parse::Input,
        format: IFDDataFormat,
        n_components: u32,
        alignment: TIFFByteAlignment,
    ) -> parse::Result<Self> {
        let n_components = n_components as usize;

        match format {
            IFDDataFormat::UnsignedByte => {
                let (i, x) = alignment.parse_u8(i)?;
                Ok((i, IFDDataContents::UnsignedByte(x)))
            }
            IFDDataFormat::AsciiString => {
                // The count includes the terminating NUL
                let (i, s) = take(n_components)(i)?;
                let s = s.split(|&x| x == 0).next().unwrap_or_default();
                let s = String::from_utf8_lossy(s);
                Ok((i, IFDDataContents::AsciiString(s.to_string())))
            }
            IFDDataFormat::UnsignedShort => {
                let (i, x) = alignment.parse_u16(i)?;
                Ok((i, IFDDataContents::UnsignedShort(x)))
            }
            IFDDataFormat::UnsignedLong | IFDDataFormat::IFDOffset => {
                let (i, x) = alignment.parse_u32(i)?;
                Ok((i, IFDDataContents::UnsignedLong(x)))
            }
            IFDDataFormat::UnsignedRational => {
                let (i, (num, denom)) =
                    tuple((|x| alignment.parse_u32(x), |x| alignment.parse_u32(x)))(i)?;
                Ok((i, IFDDataContents::UnsignedRational(num, denom)))
            }
            IFDDataFormat::SignedByte => {
                let (i, x) = alignment.parse_i8(i)?;
                Ok((i, IFDDataContents::SignedByte(x)))
            }
            IFDDataFormat::Undefined => {
                let (i, x) = take(n_components)(i)?;
                Ok((i, IFDDataContents::Undefined(x.to_vec())))
            }
            IFDDataFormat::SignedShort => {
                let (i, x) = alignment.parse_i16(i)?;
                Ok((i, IFDDataContents::SignedShort(x)))
            }
            IFDDataFormat::SignedLong => {
                let (i, x) = alignment.parse_i32(i)?;
                Ok((i, IFDDataContents::SignedLong(x)))
            }
            IFDDataFormat::SignedRational => {
                let (i, (num, denom)) =
                    tuple((|x| alignment.parse_i32(x), |x| alignment.parse_i32(x)))(i)?;
                Ok((i, IFDDataContents::SignedRational(num, denom)))
            }
            IFDDataFormat::SingleFloat => {
                let (i, x) = alignment.parse_f32(i)?;
                Ok((i, IFDDataContents::SingleFloat(x)))
            }
            IFDDataFormat::DoubleFloat => {
                let (i, x) = alignment.parse_f64(i)?;
                Ok((i, IFDDataContents::DoubleFloat(x)))
            }
        }
    }
}

impl Serialize for IFDDataContents {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            IFDDataContents::UnsignedByte(x) => ser.serialize_u8(*x),
            IFDDataContents::AsciiString(x) => ser.serialize_str(x),
            IFDDataContents::UnsignedShort(x) => ser.serialize_u16(*x),
            IFDDataContents::UnsignedLong(x) => ser.serialize_u32(*x),
            IFDDataContents::UnsignedRational(x, y) => {
                let mut tup = ser.serialize_tuple(2)?;
                tup.serialize_element(x)?;
                tup.serialize_element(y)?;
                tup.end()
            }
            IFDDataContents::SignedByte(x) => ser.serialize_i8(*x),
            IFDDataContents::Undefined(x) => ser.serialize_bytes(x),
            IFDDataContents::SignedShort(x) => ser.serialize_i16(*x),
            IFDDataContents::SignedLong(x) => ser.serialize_i32(*x),
            IFDDataContents::SignedRational(x, y) => {
                let mut tup = ser.serialize_tuple(2)?;
                tup.serialize_element(x)?;
                tup.serialize_element(y)?;
                tup.end()
            }
            IFDDataContents::SingleFloat(x) => ser.serialize_f32(*x),
            IFDDataContents::DoubleFloat(x) => ser.serialize_f64(*x),
        }
    }
}

impl TryFrom<&IFDDataContents> for f64 {
    type Error = &'static str;

    fn try_from(data: &IFDDataContents) -> Result<Self, Self::Error> {
        match data {
            IFDDataContents::UnsignedByte(x) => Ok(*x as f64),
            IFDDataContents::UnsignedShort(x) => Ok(*x as f64),
            IFDDataContents::UnsignedLong(x) => Ok(*x as f64),
            IFDDataContents::SignedByte(x) => Ok(*x as f64),
            IFDDataContents::SignedShort(x) => Ok(*x as f64),
            IFDDataContents::SignedLong(x) => Ok(*x as f64),
            IFDDataContents::SingleFloat(x) => Ok(*x as f64),
            IFDDataContents::DoubleFloat(x) => Ok(*x),
            IFDDataContents::UnsignedRational(x, y) => Ok((*x as f64) / (*y as f64)),
            IFDDataContents::SignedRational(x, y) => Ok((*x as f64) / (*y as f64)),
            _ => Err("Cannot convert data type to f64"),
        }
    }
}
