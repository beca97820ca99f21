// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Code VM Inspector
//!
//! Entry point for the `cvm-inspect` binary: offline tooling on top of
//! `code-vm-mirror` for operators poking at VM state.
//!
//! - `zeros`   derive the zero table (and empty root) for a tree seed
//! - `decode`  decode one packed virtual account
//! - `memory`  parse a memory-account dump, list or decode its slots
//! - `verify`  check a Merkle proof against a root
//! - `version` print build version information
//!
//! Reports go to stdout as pretty JSON; logs go to stderr.

mod cli;
mod commands;
mod input;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Commands, InspectorCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = InspectorCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    let report = match &cli.command {
        Commands::Zeros(args) => commands::zeros(args)?,
        Commands::Decode(args) => commands::decode(args)?,
        Commands::Memory(args) => commands::memory(args)?,
        Commands::Verify(args) => commands::verify_proof(args)?,
        Commands::Version => {
            print_version();
            return Ok(());
        }
    };

    let rendered = serde_json::to_string_pretty(&report).context("failed to render report")?;
    println!("{rendered}");
    Ok(())
}

fn print_version() {
    println!("cvm-inspect {}", env!("CARGO_PKG_VERSION"));
    println!("tree depth  {}", code_vm_mirror::config::COMPRESSED_STATE_DEPTH);
    println!("rustc       {}", rustc_version());
}

fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
