//! Display formatting for CLI output
//!
//! Notes go to stdout with severity colors; the persisted notes file uses the
//! plain rendering from `envpack_core::Notes`.

use console::{Style, style};
use envpack_core::{Notes, RunReport, Severity};
use std::path::Path;

use crate::error::CliError;

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::new().cyan().bold(),
        Severity::Action => Style::new().yellow().bold(),
        Severity::Critical => Style::new().red().bold(),
    }
}

/// One-line summary of the unpacked release
pub fn print_report(report: &RunReport) {
    let previous = report.releases.previous.as_deref().unwrap_or("none");
    let new = report.releases.new.as_deref().unwrap_or("unknown");

    println!(
        "{} release {} (previous: {})",
        style("Unpacked").green().bold(),
        style(new).bold(),
        previous
    );
    println!("  {} {}", style("Upgrade").dim(), report.upgrade);
    if let Some(entries) = report.toc_entries {
        println!("  {} {} file(s)", style("Contents").dim(), entries);
    }
}

/// Numbered notes, followed by where they are saved
pub fn print_notes(notes: &Notes, notes_path: &Path, dry_run: bool) {
    println!("\n");
    for (n, advisory) in notes.numbered() {
        println!(
            "{}\n",
            severity_style(advisory.severity).apply_to(format!("NOTE {n}"))
        );
        println!("  {}\n", advisory.message);
    }
    println!();
    println!("These notes are saved to {}", notes_path.display());
    if dry_run {
        println!("{}", style("(dryrun skipping write)").dim());
    }
}

/// Single-line diagnostic; the full report only with `--debug`
pub fn print_error(err: CliError, debug: bool) {
    eprintln!("{} {}", style("error:").red().bold(), err);
    if debug {
        eprintln!("{:?}", miette::Report::new(err));
    }
}
