//! Writing an unencrypted copy of a PDF.

use crate::{Error, Result};
use lopdf::Document;
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};

/// What happened to a PDF that went through [`decrypt_copy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfReport {
    pub output: PathBuf,
    pub pages: usize,
    pub was_encrypted: bool,
}

/// Load the PDF at `input`, decrypt it with `password` if it is encrypted, and write every page
/// of it to `output`. An existing file at `output` is overwritten.
///
/// When no password is given the empty user password is tried, which is enough for documents
/// that only carry an owner password. A wrong password is an error and nothing is written.
pub fn decrypt_copy(input: &Path, output: &Path, password: Option<&str>) -> Result<PdfReport> {
    let mut doc = Document::load(input)?;

    let was_encrypted = doc.is_encrypted();
    if was_encrypted {
        debug!(path = %input.display(), "PDF is encrypted");
        doc.decrypt(password.unwrap_or(""))
            .map_err(|e| Error::Decrypt(e.to_string()))?;
        info!("Decrypted {}", input.display());
    } else if password.is_some() {
        debug!("PDF is not encrypted, ignoring the password");
    }

    let pages = doc.get_pages().len();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::Save(e.to_string()))?;
    fs::write(output, buffer).map_err(|source| Error::Io {
        path: output.display().to_string(),
        source,
    })?;

    info!(pages, "Wrote {}", output.display());
    Ok(PdfReport {
        output: output.to_path_buf(),
        pages,
        was_encrypted,
    })
}
