use crate::exif::IFDTag;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to parse image: {0}")]
    Parse(String),

    #[error("Image does not contain EXIF data.")]
    NoExif,

    #[error("Image has no {0:?} tag in its EXIF data")]
    MissingGpsField(IFDTag),

    #[error("The {0:?} tag does not hold a usable value")]
    InvalidGpsField(IFDTag),

    #[error("Unexpected GPS reference {0:?} (expected N, S, E or W)")]
    InvalidReference(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Unable to decrypt PDF: {0}")]
    Decrypt(String),

    #[error("Unable to serialize PDF: {0}")]
    Save(String),

    #[error("Unable to open a browser: {0}")]
    Browser(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
