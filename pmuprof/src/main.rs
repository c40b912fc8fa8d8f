//! # pmuprof - Main Entry Point
//!
//! Parses arguments, validates inputs, and runs the report pipeline with
//! the `nm` and `objdump` collaborators.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, BufWriter};

use pmuprof::cli::Args;
use pmuprof::preflight::run_preflight_checks;
use pmuprof::profiling::read_profile;
use pmuprof::report::{generate_report, Binaries, Collaborators};
use pmuprof::symbolization::{NmSymbolSource, ObjdumpDisassembler};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<()> {
    let args = Args::parse();

    run_preflight_checks(&args.profile, &args.kernel, &args.user, args.quiet)?;

    let profile = read_profile(&args.profile)
        .with_context(|| format!("Failed to load profile {}", args.profile.display()))?;

    let symbols = NmSymbolSource::new(&args.nm);
    let disassembler = ObjdumpDisassembler::new(&args.objdump);
    let tools = Collaborators { symbols: &symbols, disassembler: &disassembler };
    let binaries = Binaries { kernel: &args.kernel, user: &args.user };

    let mut out = BufWriter::new(io::stdout().lock());
    let report = generate_report(&profile, binaries, &tools, &args.report_config(), &mut out)
        .context("Failed to generate report")?;

    info!(
        "Attributed {} samples ({} kernel, {} user)",
        report.flat.total_samples, report.flat.kernel.samples, report.flat.user.samples
    );
    Ok(())
}
