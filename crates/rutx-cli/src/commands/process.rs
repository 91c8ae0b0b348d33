//! Process command - extract the customer from a single invoice file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rutx_core::invoice::{CustomerParser, ExtractionPass};
use rutx_core::{read_document_text, CustomerRecord, Field, Intake, Outcome};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Customer sheet to update (overrides the configured store path)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Print the extracted customer without touching the store
    #[arg(long)]
    dry_run: bool,

    /// Output format for --dry-run
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(store) = args.store {
        config.store.path = store;
    }

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let parser = CustomerParser::from_config(&config.extraction);
    let text = read_document_text(&args.input, &config.pdf);

    if args.dry_run {
        let result = parser.parse(&text?);
        if result.tax_id_pass == ExtractionPass::Fallback {
            debug!("RUT recovered by the fallback pass");
        }

        println!("{}", format_record(&result.record, args.format)?);
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
        return Ok(());
    }

    let source = args.input.display().to_string();
    let mut intake = Intake::new(parser, config.open_store());
    let report = intake.ingest(&source, text);
    let store = intake.store().path().display();

    if let Some(warning) = report.warning() {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let tax_id = report.tax_id.as_deref().unwrap_or_default();
    match report.outcome {
        Outcome::Success => println!(
            "{} Added customer {} to {}",
            style("✓").green(),
            tax_id,
            store
        ),
        Outcome::Duplicate => println!(
            "{} Customer {} already exists in {}, not added",
            style("ℹ").blue(),
            tax_id,
            store
        ),
        Outcome::Error => anyhow::bail!(
            "{}: {}",
            source,
            report.message.as_deref().unwrap_or("unknown error")
        ),
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record(record: &CustomerRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &CustomerRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CustomerRecord::headers())?;
    wtr.write_record(record.to_row().map(|v| v.unwrap_or_default()))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data.trim_end().to_string())
}

fn format_text(record: &CustomerRecord) -> String {
    Field::ALL
        .iter()
        .map(|field| {
            format!(
                "{:<16} {}",
                format!("{}:", field),
                record.get(*field).unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
