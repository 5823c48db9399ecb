use clap::Parser;
use metasleuth::{
    browser::{Browser, NoBrowser, SystemBrowser},
    dispatch::{self, Outcome},
    exif::IFDEntry,
    version, Config,
};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    info!("Starting {} v{}", version::name(), version::version());

    let browser: &dyn Browser = if config.no_browser {
        &NoBrowser
    } else {
        &SystemBrowser
    };
    let outcome = dispatch::run(&config, browser)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        Outcome::Located(report) => {
            if config.list_tags {
                print_entries(&report.entries);
            }
            println!("{}", report.map_url);
        }
        Outcome::Decrypted(report) => {
            let state = if report.was_encrypted { "decrypted" } else { "unencrypted" };
            println!(
                "Wrote {} page(s) of the {} document to {}",
                report.pages,
                state,
                report.output.display()
            );
        }
        Outcome::Unsupported { .. } => {
            println!(
                "File extension not supported/recognized... Make sure the file has the correct extension..."
            );
        }
    }

    Ok(())
}

fn print_entries(entries: &[IFDEntry]) {
    println!("Found the following Exif data:");
    println!();
    println!("{:30} {:20} {}", "Tag type", "Data type", "Data");
    println!("--------------------------------------------------------------------------");
    for entry in entries {
        let tagtype = format!("{:?}", entry.tagtype);
        let data_format = format!("{:?}", entry.data_format);
        let content = if entry.content.len() == 1 {
            format!("{:?}", entry.content[0])
        } else {
            format!("{:?}", entry.content)
        };
        println!("{:30} {:20} {}", tagtype, data_format, content);
    }
    println!();
}
