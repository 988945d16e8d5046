//! Parse command - extract data from a single report.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use fieldlog_core::extraction::{ExtractionResult, ReportParser};

use super::{load_config, open_store};
use crate::output::{format_report, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Store the extracted report in the configured database
    #[arg(long)]
    save: bool,

    /// Show which rule matched each field
    #[arg(long)]
    show_matches: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let extractor = config.build_extractor()?;

    let text = read_input(&args.input)?;
    info!(
        "Parsing report from {} with '{}' rules",
        args.input.display(),
        extractor.rules_name()
    );

    let result = extractor.parse(&text);

    if args.save {
        let store = open_store(&config)?;
        let stored = store.insert(&result.report)?;
        eprintln!(
            "{} Saved report #{} to {}",
            style("✓").green(),
            stored.id,
            config.storage.database.display()
        );
    }

    let output = format_report(&result.report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_matches {
        print_matches(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(fs::read_to_string(input)?)
}

fn print_matches(result: &ExtractionResult) {
    eprintln!();
    for m in &result.matches {
        eprintln!(
            "{} {:<24} rule {:<2} {:?}",
            style("ℹ").blue(),
            m.field.column(),
            m.rule,
            m.source
        );
    }
    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}
