// SPDX-License-Identifier: MIT OR Apache-2.0
//! `diagram-bridge` - console host for a synchronized diagram
//!
//! Loads a diagram document, mounts it on the headless engine and reads
//! interactions from stdin:
//! - `add`, `remove`, `link`, `unlink`, `group`, `set`, `copy`
//! - `show`, `save`, `quit`
//!
//! ## Architecture
//!
//! The host owns the declarative model. Interactions go to the engine, the
//! resulting change events come back through the component's callback and
//! are applied to the model, which is then handed back to the component.
//! With `--watch`, edits to the document on disk are reloaded the same way.

mod args;
mod commands;
mod document;
mod error;
mod file_watcher;
mod host;
mod session;

use args::Args;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let args = Args::parse();

    // Directives from RUST_LOG come first, then the command line
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in args.log_level.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Invalid log directive `{directive}`: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting diagram-bridge v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = host::run(&args) {
        tracing::error!("diagram-bridge failed: {e}");
        std::process::exit(1);
    }
}
