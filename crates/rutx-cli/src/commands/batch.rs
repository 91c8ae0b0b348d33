//! Batch processing command for multiple invoice files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use rutx_core::invoice::CustomerParser;
use rutx_core::{read_document_text, DocumentReport, Intake, Outcome};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Customer sheet to update (overrides the configured store path)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Also write a per-document report to this CSV file
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(store) = args.store {
        config.store.path = store;
    }

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let mut intake = Intake::new(
        CustomerParser::from_config(&config.extraction),
        config.open_store(),
    );

    // Documents are read lazily so the bar tracks the file being ingested.
    let documents = files.iter().map(|path| {
        pb.set_message(file_name(path).to_string());
        let text = read_document_text(path, &config.pdf);
        pb.inc(1);
        (path.display().to_string(), text)
    });
    let report = intake.ingest_batch(documents);

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report.reports)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    for document in &report.reports {
        if let Some(warning) = document.warning() {
            println!("{} {}: {}", style("⚠").yellow(), document.source, warning);
        }
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.summary.total(),
        start.elapsed()
    );
    println!("   {}", report.summary);
    println!("   Store: {}", intake.store().path().display());

    let failed: Vec<&DocumentReport> = report
        .reports
        .iter()
        .filter(|r| r.outcome == Outcome::Error)
        .collect();

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.source,
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand each pattern, keeping `.pdf` and `.txt` files in argument order.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        for entry in glob(pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if matches!(ext.as_str(), "pdf" | "txt") && !files.contains(&path) {
                files.push(path);
            } else {
                debug!("Ignoring {}", path.display());
            }
        }
    }

    Ok(files)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

fn write_summary(path: &Path, reports: &[DocumentReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "rut", "missing_fields", "error"])?;

    for report in reports {
        let missing: Vec<&str> = report.missing_fields.iter().map(|f| f.header()).collect();

        wtr.write_record([
            file_name(Path::new(&report.source)),
            &report.outcome.to_string(),
            report.tax_id.as_deref().unwrap_or(""),
            &missing.join(", "),
            report.message.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
