//! Batch command - confirm invoices and export the payment batch.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

use virement_core::{
    AcceptSuggestions, BatchSession, DocumentPipeline, FirstPageRasterizer, IngestReport,
    LazyOcrEngine, RecordForm, SepaSerializer, TabularExporter, TabularFormat, UploadedDocument,
};

use super::{expand_inputs, load_config};
use crate::form::TerminalForm;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns (PDF, JPG, PNG, TXT)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory for the exported files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Summary table format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    table: TableFormat,

    /// Accept every suggestion without prompting
    #[arg(short, long)]
    yes: bool,

    /// Skip the SEPA XML export
    #[arg(long)]
    no_xml: bool,

    /// Skip the summary table export
    #[arg(long)]
    no_table: bool,

    /// Report advisory validation issues for each record
    #[arg(long)]
    validate: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum TableFormat {
    /// Excel workbook
    Xlsx,
    /// Comma-separated values
    Csv,
}

impl From<TableFormat> for TabularFormat {
    fn from(format: TableFormat) -> Self {
        match format {
            TableFormat::Xlsx => TabularFormat::Xlsx,
            TableFormat::Csv => TabularFormat::Csv,
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let files = expand_inputs(&args.inputs)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let documents = files
        .iter()
        .map(|path| UploadedDocument::from_path(path))
        .collect::<Result<Vec<_>, _>>()?;

    let pipeline = DocumentPipeline::new(
        FirstPageRasterizer::from_config(&config.document),
        LazyOcrEngine::new(config.ocr.clone()),
    );

    // Prompts and a progress bar would fight over the terminal.
    let pb = if args.yes {
        let pb = ProgressBar::new(documents.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut form: Box<dyn RecordForm> = if args.yes {
        Box::new(AcceptSuggestions)
    } else {
        Box::new(TerminalForm::new(args.validate))
    };

    let mut session = BatchSession::new();
    let mut report = IngestReport::default();

    for document in &documents {
        pb.set_message(document.name.clone());
        let step = session.ingest(std::slice::from_ref(document), &pipeline, form.as_mut());
        report.confirmed += step.confirmed;
        report.failed.extend(step.failed);
        pb.inc(1);

        if !report.failed.is_empty() && !args.continue_on_error {
            pb.abandon();
            let failed = &report.failed[0];
            error!("Failed to process {}: {}", failed.name, failed.error);
            anyhow::bail!("Processing failed for {}: {}", failed.name, failed.error);
        }
    }

    pb.finish_and_clear();

    for failed in &report.failed {
        println!(
            "{} {} - {}",
            style("✗").red(),
            failed.name,
            failed.error
        );
    }

    if session.is_empty() {
        anyhow::bail!("No invoices were confirmed, nothing to export");
    }

    // The interactive form already reported issues while prompting.
    if args.validate && args.yes {
        for (index, record) in session.records().iter().enumerate() {
            for issue in record.validate() {
                println!("{} #{}: {}", style("⚠").yellow(), index + 1, issue);
            }
        }
    }

    fs::create_dir_all(&args.output_dir)?;

    if !args.no_table {
        let exporter = TabularExporter::new(args.table.into())
            .with_file_stem(config.export.table_file_name.clone());
        let artifact = session.export_table(&exporter)?;
        let path = artifact.write_to(&args.output_dir)?;
        println!(
            "{} Summary table written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if !args.no_xml {
        let artifact = session.export_sepa(&SepaSerializer::from_config(&config))?;
        let path = artifact.write_to(&args.output_dir)?;
        println!(
            "{} SEPA batch written to {}",
            style("✓").green(),
            path.display()
        );
    }

    info!(
        "Confirmed {} of {} invoices",
        report.confirmed,
        documents.len()
    );

    println!();
    println!("{}", style("Batch Summary").bold());
    println!("  Confirmed: {}", style(report.confirmed).green());
    if !report.failed.is_empty() {
        println!("  Failed:    {}", style(report.failed.len()).red());
    }
    println!("  Total time: {:.2}s", start.elapsed().as_secs_f64());
    debug!("Batch finished in {:?}", start.elapsed());

    Ok(())
}
