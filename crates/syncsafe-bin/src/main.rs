mod cli;
mod confirm;

use anyhow::Result;
use cli::Cli;
use std::path::{Path, PathBuf};
use syncsafe_core::{RenameOptions, RunReport, Sanitizer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting syncsafe");

    let target = resolve_target(cli.target.clone())?;
    let sanitizer = build_sanitizer(&cli)?;

    info!("Target directory: {:?}", target);

    let options = RenameOptions {
        dry_run: !cli.rename,
        excluded_prefixes: cli.exclude_prefixes.clone(),
    };

    if options.dry_run {
        warn!("Dry run mode - no changes will be made");
    } else if !cli.yes && !confirm::confirm_target(&target)? {
        println!("Aborted, no changes made.");
        return Ok(());
    }

    let report = syncsafe_core::process_directory(&target, &sanitizer, &options)?;
    let log_path = report.write_csv_with_fallback(&cli.log_file)?;

    print_summary(&report, &log_path, options.dry_run);

    info!("Syncsafe completed successfully");
    Ok(())
}

fn resolve_target(target: Option<PathBuf>) -> Result<PathBuf> {
    let target = match target {
        Some(path) => {
            if path.is_relative() {
                anyhow::bail!("Relative paths will not work, use a full path: {:?}", path);
            }
            path
        }
        None => std::env::current_dir()?,
    };

    if !target.exists() {
        anyhow::bail!("Target directory does not exist: {:?}", target);
    }

    if !target.is_dir() {
        anyhow::bail!("Target must be a directory: {:?}", target);
    }

    Ok(target)
}

fn build_sanitizer(cli: &Cli) -> Result<Sanitizer> {
    let mut sanitizer = Sanitizer::new();

    if let Some(path) = &cli.extensions_file {
        sanitizer = sanitizer.with_extensions(syncsafe_core::load_list(path)?);
        info!("Loaded extension table from {:?}", path);
    }

    if let Some(path) = &cli.reserved_file {
        sanitizer = sanitizer.with_reserved_names(syncsafe_core::load_list(path)?);
        info!("Loaded reserved-name table from {:?}", path);
    }

    Ok(sanitizer)
}

fn print_summary(report: &RunReport, log_path: &Path, dry_run: bool) {
    for record in report.renamed_records() {
        if dry_run {
            println!(
                "{} {{{}}} would be renamed to {{{}}}",
                record.kind, record.old_name, record.new_name
            );
        } else {
            println!(
                "{} {{{}}} was renamed to {{{}}}",
                record.kind, record.old_name, record.new_name
            );
        }
    }

    if report.renamed == 0 {
        println!("No files or folders were renamed");
    }

    for record in report.failed_records() {
        println!(
            "FAILED: {} {{{}}} could not be renamed (see log)",
            record.kind, record.old_name
        );
    }

    println!("\nScan complete!");
    println!("  Files processed: {}", report.files_processed);
    println!("  Folders processed: {}", report.dirs_processed);
    println!("  Renamed: {}", report.renamed);
    println!("  Unchanged: {}", report.unchanged);
    if report.failed > 0 {
        println!("  Failed: {}", report.failed);
    }
    println!("  Log written to: {}", log_path.display());
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .with(filter)
        .init();

    Ok(())
}
