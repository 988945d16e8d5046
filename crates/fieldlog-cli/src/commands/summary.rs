//! Summary command - statistics over stored reports.

use clap::Args;

use fieldlog_core::summary::{collection_summary, SummaryOutcome};
use fieldlog_core::StoreError;

use super::{load_config, open_store};
use crate::output::{format_summary, SummaryFormat};

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: SummaryFormat,
}

pub async fn run(args: SummaryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let outcome = match open_store(&config) {
        Ok(store) => collection_summary(&store),
        Err(e) => SummaryOutcome::failed(&StoreError::Other(e.to_string())),
    };
    println!("{}", format_summary(&outcome, args.format)?.trim_end());

    if let SummaryOutcome::Failed { error } = outcome {
        anyhow::bail!("Summary failed: {}", error);
    }

    Ok(())
}
