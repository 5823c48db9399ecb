//! Routing the input file to the handler for its type.

use crate::{
    browser::Browser,
    image::{self, ImageReport},
    pdf::{self, PdfReport},
    Config, Error, Result,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Unsupported,
}

impl FileKind {
    /// Classify a file by the suffix of its name, ignoring case. The file itself is never touched.
    ///
    /// The suffix is whatever follows the last dot of the file name, so a file named just `.jpg`
    /// is an image too.
    pub fn from_path(path: &Path) -> Self {
        let extension = match path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit_once('.'))
        {
            Some((_, e)) => e.to_ascii_lowercase(),
            None => return FileKind::Unsupported,
        };

        match extension.as_str() {
            "jpg" | "jpeg" | "bmp" => FileKind::Image,
            "pdf" => FileKind::Pdf,
            _ => FileKind::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Located(ImageReport),
    Decrypted(PdfReport),
    Unsupported { file: PathBuf },
}

/// Run the handler that matches the configured file. Images are located and their map URL is
/// handed to `browser`; PDFs are decrypted into `config.output`.
pub fn run(config: &Config, browser: &dyn Browser) -> Result<Outcome> {
    let path = config.file.as_path();

    match FileKind::from_path(path) {
        FileKind::Image => {
            info!("Reading image {}", path.display());
            let report = image::locate(path, config.list_tags)?;
            browser.open(&report.map_url).map_err(Error::Browser)?;
            Ok(Outcome::Located(report))
        }
        FileKind::Pdf => {
            info!("Reading PDF {}", path.display());
            let report = pdf::decrypt_copy(path, &config.output, config.password.as_deref())?;
            Ok(Outcome::Decrypted(report))
        }
        FileKind::Unsupported => {
            warn!("Unsupported file extension: {}", path.display());
            Ok(Outcome::Unsupported {
                file: path.to_path_buf(),
            })
        }
    }
}
