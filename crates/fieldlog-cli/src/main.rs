//! CLI application for driver field-collection reports.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[cfg(feature = "serve")]
use commands::serve;
use commands::{batch, config, export, init, parse, summary};

/// Field-collection reports - extract structured data from driver reports
#[derive(Parser)]
#[command(name = "fieldlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a single report from a file or stdin
    Parse(parse::ParseArgs),

    /// Extract every report matching a glob pattern
    Batch(batch::BatchArgs),

    /// Summarize stored reports
    Summary(summary::SummaryArgs),

    /// Export stored reports to CSV
    Export(export::ExportArgs),

    /// Create the report database
    Init,

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Run the HTTP RPC server
    #[cfg(feature = "serve")]
    Serve(serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Summary(args) => summary::run(args, config_path).await,
        Commands::Export(args) => export::run(args, config_path).await,
        Commands::Init => init::run(config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
        #[cfg(feature = "serve")]
        Commands::Serve(args) => serve::run(args, config_path).await,
    }
}
