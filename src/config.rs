//! Command line configuration.

use crate::version;
use clap::Parser;
use std::path::PathBuf;

/// Where the decrypted copy of a PDF is written when `--output` isn't given.
pub const DEFAULT_PDF_OUTPUT: &str = "decrypted_output.pdf";

/// Find where a photo was taken, or strip the password from a PDF.
#[derive(Debug, Clone, Parser)]
#[command(name = version::name(), version)]
pub struct Config {
    /// Full path to the document (.jpg, .jpeg, .bmp or .pdf)
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// Password used to decrypt an encrypted PDF. The empty user password is tried when this
    /// isn't set.
    #[arg(short, long, env = "METASLEUTH_PDF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Where to write the decrypted PDF
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_PDF_OUTPUT)]
    pub output: PathBuf,

    /// Print the map URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// List every Exif tag found in the image
    #[arg(long)]
    pub list_tags: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Configuration for a file with every option left at its default.
    pub fn for_file<P: Into<PathBuf>>(file: P) -> Self {
        Config {
            file: file.into(),
            password: None,
            output: PathBuf::from(DEFAULT_PDF_OUTPUT),
            no_browser: false,
            list_tags: false,
            json: false,
        }
    }
}
