//! Builders for the synthetic JPEG, TIFF and PDF inputs used by the unit tests.

use crate::exif::TIFFByteAlignment;
use lopdf::{
    content::{Content, Operation},
    encryption, Dictionary, Document, Object, ObjectId, Stream, StringFormat,
};
use std::iter::FromIterator;

/// A single IFD entry whose value bytes are already encoded in the target byte order.
#[derive(Clone)]
pub struct Entry {
    pub tag: u16,
    format: u16,
    count: u32,
    data: Vec<u8>,
}

impl Entry {
    pub fn ascii(tag: u16, s: &str) -> Self {
        let mut data = s.as_bytes().to_vec();
        data.push(0);
        Entry {
            tag,
            format: 2,
            count: data.len() as u32,
            data,
        }
    }

    pub fn rationals(tag: u16, values: &[(u32, u32)], alignment: TIFFByteAlignment) -> Self {
        let data = values
            .iter()
            .flat_map(|&(num, denom)| [u32_bytes(num, alignment), u32_bytes(denom, alignment)])
            .flatten()
            .collect();
        Entry {
            tag,
            format: 5,
            count: values.len() as u32,
            data,
        }
    }

    pub fn undefined(tag: u16, bytes: &[u8]) -> Self {
        Entry {
            tag,
            format: 7,
            count: bytes.len() as u32,
            data: bytes.to_vec(),
        }
    }
}

/// The four GPS tags that locate an image.
pub struct Gps {
    lat_ref: String,
    lat: [(u32, u32); 3],
    lon_ref: String,
    lon: [(u32, u32); 3],
}

impl Gps {
    pub fn new(lat_ref: &str, lat: [(u32, u32); 3], lon_ref: &str, lon: [(u32, u32); 3]) -> Self {
        Gps {
            lat_ref: lat_ref.to_string(),
            lat,
            lon_ref: lon_ref.to_string(),
            lon,
        }
    }

    pub fn entries(&self, alignment: TIFFByteAlignment) -> Vec<Entry> {
        vec![
            Entry::ascii(0x0001, &self.lat_ref),
            Entry::rationals(0x0002, &self.lat, alignment),
            Entry::ascii(0x0003, &self.lon_ref),
            Entry::rationals(0x0004, &self.lon, alignment),
        ]
    }
}

fn u16_bytes(x: u16, alignment: TIFFByteAlignment) -> [u8; 2] {
    match alignment {
        TIFFByteAlignment::BigEndian => x.to_be_bytes(),
        TIFFByteAlignment::LittleEndian => x.to_le_bytes(),
    }
}

fn u32_bytes(x: u32, alignment: TIFFByteAlignment) -> [u8; 4] {
    match alignment {
        TIFFByteAlignment::BigEndian => x.to_be_bytes(),
        TIFFByteAlignment::LittleEndian => x.to_le_bytes(),
    }
}

fn ifd_size(n_entries: usize) -> usize {
    2 + 12 * n_entries + 4
}

fn data_area_size(entries: &[Entry]) -> usize {
    entries
        .iter()
        .filter(|e| e.data.len() > 4)
        .map(|e| e.data.len())
        .sum()
}

/// Lays out a TIFF structure: the header, IFD0 holding one pointer per sub-IFD, then each sub-IFD
/// followed by the values that don't fit in the entries themselves.
pub struct TiffWriter {
    alignment: TIFFByteAlignment,
    subifds: Vec<(u16, Vec<Entry>)>,
}

impl TiffWriter {
    pub fn new(alignment: TIFFByteAlignment) -> Self {
        TiffWriter {
            alignment,
            subifds: Vec::new(),
        }
    }

    pub fn with_gps(self, gps: &Gps) -> Self {
        let entries = gps.entries(self.alignment);
        self.with_gps_entries(entries)
    }

    pub fn with_gps_entries(mut self, entries: Vec<Entry>) -> Self {
        self.subifds.push((0x8825, entries));
        self
    }

    pub fn with_exif_version(mut self, version: &[u8; 4]) -> Self {
        self.subifds
            .push((0x8769, vec![Entry::undefined(0x9000, version)]));
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let alignment = self.alignment;

        // Work out where every sub-IFD lands before writing IFD0, which points at them
        let ifd0_offset = 8;
        let mut cursor = ifd0_offset + ifd_size(self.subifds.len());
        let mut pointers = Vec::new();
        for (tag, entries) in self.subifds.iter() {
            pointers.push(Entry {
                tag: *tag,
                format: 4,
                count: 1,
                data: u32_bytes(cursor as u32, alignment).to_vec(),
            });
            cursor += ifd_size(entries.len()) + data_area_size(entries);
        }

        let mut out = Vec::new();
        out.extend_from_slice(match alignment {
            TIFFByteAlignment::BigEndian => b"MM",
            TIFFByteAlignment::LittleEndian => b"II",
        });
        out.extend_from_slice(&u16_bytes(0x002a, alignment));
        out.extend_from_slice(&u32_bytes(ifd0_offset as u32, alignment));

        write_ifd(&mut out, &pointers, alignment);
        for (_, entries) in self.subifds.iter() {
            write_ifd(&mut out, entries, alignment);
        }
        out
    }
}

/// Append an IFD at the end of `out`, with its out-of-line values directly after it.
fn write_ifd(out: &mut Vec<u8>, entries: &[Entry], alignment: TIFFByteAlignment) {
    let mut data_offset = out.len() + ifd_size(entries.len());
    let mut data_area = Vec::new();

    out.extend_from_slice(&u16_bytes(entries.len() as u16, alignment));
    for e in entries {
        out.extend_from_slice(&u16_bytes(e.tag, alignment));
        out.extend_from_slice(&u16_bytes(e.format, alignment));
        out.extend_from_slice(&u32_bytes(e.count, alignment));
        if e.data.len() <= 4 {
            let mut value = e.data.clone();
            value.resize(4, 0);
            out.extend_from_slice(&value);
        } else {
            out.extend_from_slice(&u32_bytes(data_offset as u32, alignment));
            data_offset += e.data.len();
            data_area.extend_from_slice(&e.data);
        }
    }
    out.extend_from_slice(&u32_bytes(0, alignment));
    out.extend_from_slice(&data_area);
}

/// Wrap a TIFF structure in an APP1 Exif segment.
pub fn exif_segment(tiff: &[u8]) -> Vec<u8> {
    let size = (2 + 6 + tiff.len()) as u16;
    [&b"\xff\xe1"[..], &size.to_be_bytes()[..], &b"Exif\x00\x00"[..], tiff].concat()
}

/// A minimal JPEG: SOI, a JFIF APP0 segment, the optional Exif segment, a quantization table and
/// a short scan terminated by EOI.
pub fn jpeg(exif: Option<&[u8]>) -> Vec<u8> {
    let mut out = b"\xff\xd8".to_vec();
    out.extend_from_slice(b"\xff\xe0\x00\x10JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00");
    if let Some(tiff) = exif {
        out.extend_from_slice(&exif_segment(tiff));
    }
    out.extend_from_slice(b"\xff\xdb\x00\x04\x00\x01");
    out.extend_from_slice(b"\xff\xda\x00\x02scan data\xff\xd0more\xff\xd9");
    out
}

/// A PDF with `num_pages` pages, each showing the text "Page <n>".
pub fn pdf(num_pages: u32) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

/// Padding appended to passwords by the standard security handler.
const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|b| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            b ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
        })
        .collect()
}

/// Encrypt `doc` in place with 40-bit RC4 (standard security handler, revision 2) so that it
/// opens with `user_password`.
pub fn encrypt(doc: &mut Document, user_password: &str) {
    let encrypt_id = doc.add_object(Dictionary::from_iter(vec![
        ("Filter", Object::Name(b"Standard".to_vec())),
        ("V", Object::Integer(1)),
        ("R", Object::Integer(2)),
        ("Length", Object::Integer(40)),
        ("O", Object::String(vec![0x4f; 32], StringFormat::Hexadecimal)),
        ("P", Object::Integer(-4)),
    ]));
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    let file_id = Object::String(b"metasleuth tests".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", Object::Array(vec![file_id.clone(), file_id]));

    let key = encryption::get_encryption_key(doc, user_password, false).unwrap();
    let user_entry = Object::String(rc4(&key, &PASSWORD_PADDING), StringFormat::Hexadecimal);
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("U", user_entry);

    // RC4 is symmetric: running the per-object decryption over plaintext encrypts it
    let ids: Vec<ObjectId> = doc.objects.keys().copied().filter(|&id| id != encrypt_id).collect();
    for id in ids {
        let obj = doc.objects.get_mut(&id).unwrap();
        if let Ok(encrypted) = encryption::decrypt_object(&key, id, &*obj) {
            match obj {
                Object::Stream(stream) => stream.set_content(encrypted),
                Object::String(content, _) => *content = encrypted,
                _ => {}
            }
        }
    }
}
