// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::Parser;
use diagram_bridge::ContainerSize;
use std::path::PathBuf;

/// Console host for a synchronized diagram
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Diagram document to load (.ron or .json)
    pub model: PathBuf,

    /// Reload the document when it changes on disk
    #[arg(short, long)]
    pub watch: bool,

    /// Tracing filter directives, comma separated
    #[arg(long, default_value = "diagram_bridge=debug")]
    pub log_level: String,

    /// Simulated container size
    #[arg(long, default_value = "800x600", value_parser = parse_viewport)]
    pub viewport: ContainerSize,
}

/// Parse a `WIDTHxHEIGHT` size
fn parse_viewport(value: &str) -> Result<ContainerSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width: f32 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f32 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(ContainerSize::new(width, height))
}
