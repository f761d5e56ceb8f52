//! `workflow version`.

use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::output::output_json;

/// What `workflow version` reports about this binary.
#[derive(Debug, Clone, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    min_rust: &'static str,
    os: &'static str,
    arch: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            min_rust: env!("CARGO_PKG_RUST_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} version {} ({}/{}, rust >= {})",
            self.name, self.version, self.os, self.arch, self.min_rust
        )
    }
}

/// Execute the `workflow version` command.
pub fn run(json: bool) -> Result<()> {
    let info = VersionInfo::current();
    if json {
        output_json(&info);
    } else {
        println!("{info}");
    }
    Ok(())
}
