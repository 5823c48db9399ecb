//! Opening map URLs.

use tracing::debug;

pub trait Browser {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs in the browser registered with the operating system.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        debug!(url, "Opening system browser");
        webbrowser::open(url)
    }
}

/// Never opens anything. Used for `--no-browser`.
#[derive(Debug, Default)]
pub struct NoBrowser;

impl Browser for NoBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        debug!(url, "Browser disabled, not opening");
        Ok(())
    }
}
