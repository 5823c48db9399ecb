//! Version and build.

/// Return the program name.
pub const fn name() -> &'static str {
    match option_env!("PROGRAM_NAME") {
        Some(s) => s,
        None => "metasleuth",
    }
}

/// Return the program version.
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
