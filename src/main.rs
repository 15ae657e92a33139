use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use block_linter::config::{Args, LinterConfig};
use block_linter::validation::{LintOutcome, Linter};

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(outcome) => {
            println!("{}", format_results(&outcome, args.verbose));
            if outcome.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(error) => {
            // A missing or unreadable input aborts the run; this is not a
            // lint diagnostic.
            eprintln!("block-lint: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<LintOutcome> {
    let config = match &args.config {
        Some(path) => LinterConfig::from_file(path)?,
        None => LinterConfig::default(),
    };

    let content = match &args.file {
        Some(path) => {
            log::info!("linting {}", path.display());
            std::fs::read_to_string(path)
                .with_context(|| format!("file not found or unreadable: {}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    Ok(Linter::new(config).lint(&content))
}

/// Render a human-readable report of one lint run
fn format_results(outcome: &LintOutcome, verbose: bool) -> String {
    let mut lines = Vec::new();

    if !outcome.errors.is_empty() {
        lines.push(format!("\n❌ ERRORS ({}):\n", outcome.errors.len()));
        for error in &outcome.errors {
            lines.push(format!("  - [{}] {}", error.kind.code(), error.message));
            if verbose {
                if let Some(block) = &error.block {
                    lines.push(format!("    Block: {block}"));
                }
            }
        }
    }

    if !outcome.warnings.is_empty() {
        lines.push(format!("\n⚠️  WARNINGS ({}):\n", outcome.warnings.len()));
        for warning in &outcome.warnings {
            lines.push(format!("  - [{}] {}", warning.kind.code(), warning.message));
            if verbose {
                if let Some(block) = &warning.block {
                    lines.push(format!("    Block: {block}"));
                }
            }
        }
    }

    if outcome.errors.is_empty() && outcome.warnings.is_empty() {
        lines.push("\n✅ No issues found!".to_string());
    }

    lines.join("\n")
}
