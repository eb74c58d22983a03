//! Extract command - show field suggestions without building a batch.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use virement_core::{
    DocumentPipeline, FirstPageRasterizer, LazyOcrEngine, Suggestion, UploadedDocument,
};

use super::{expand_inputs, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob patterns (PDF, JPG, PNG, TXT)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the recognized text in the output
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let files = expand_inputs(&args.inputs)?;

    let pipeline = DocumentPipeline::new(
        FirstPageRasterizer::from_config(&config.document),
        LazyOcrEngine::new(config.ocr.clone()),
    );

    let mut suggestions = Vec::with_capacity(files.len());
    for path in &files {
        info!("Extracting fields from {}", path.display());
        let document = UploadedDocument::from_path(path)?;
        let mut suggestion = pipeline.suggest(&document)?;
        if !args.show_text && args.format == OutputFormat::Json {
            suggestion.text.clear();
        }
        suggestions.push(suggestion);
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&suggestions)?,
        OutputFormat::Text => suggestions
            .iter()
            .map(|s| format_text(s, args.show_text))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(suggestion: &Suggestion, show_text: bool) -> String {
    let mut out = String::new();
    let fields = &suggestion.fields;
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    out.push_str(&format!("=== {} ===\n", suggestion.document));
    out.push_str(&format!(
        "Source: {}\n",
        if suggestion.recognized { "OCR" } else { "embedded text" }
    ));
    out.push_str(&format!("Reference: {}\n", or_dash(&fields.invoice_reference)));
    out.push_str(&format!("Amount:    {}\n", or_dash(&fields.amount_due)));
    out.push_str(&format!("IBAN:      {}\n", or_dash(&fields.creditor_iban)));
    out.push_str(&format!(
        "Found {} of 3 fields in {}ms\n",
        fields.found_count(),
        suggestion.processing_time_ms
    ));

    if show_text {
        out.push_str("\n--- Text ---\n");
        out.push_str(&suggestion.text);
        out.push('\n');
    }

    out
}
