//! Export command - write stored reports to CSV.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use super::{load_config, open_store};
use crate::output::export_csv;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output directory (default: from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Omit the UTF-8 byte order mark
    #[arg(long)]
    no_bom: bool,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let records = store.list_all()?;
    let output_dir = args.output_dir.unwrap_or(config.export.output_dir);
    let include_bom = config.export.include_bom && !args.no_bom;

    let path = export_csv(&records, &output_dir, include_bom)?;
    info!("Exported {} reports", records.len());

    println!(
        "{} Exported {} reports to {}",
        style("✓").green(),
        records.len(),
        path.display()
    );

    Ok(())
}
