use anyhow::Result;
use clap::{Parser, Subcommand};
use rate_scout_cli::OutputFormat;
use rate_scout_cli::commands::{self, BatchArgs};

#[derive(Parser)]
#[command(name = "rate-scout")]
#[command(author, version, long_about = None)]
#[command(
    about = "Scrape the latest exchange-rate post from social media pages",
    long_about = "rate-scout drives headless Chrome through a list of pages, takes the newest post \
                  from each one and picks the current USD/LYD rate out of what it finds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape pages once and report the latest post from each
    Scrape {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Scrape pages repeatedly and keep the latest rate up to date
    Watch {
        #[command(flatten)]
        batch: BatchArgs,

        /// Seconds between batches
        #[arg(short, long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Scrape { batch } => commands::scrape::execute(&batch, cli.format),
        Commands::Watch { batch, interval } => {
            commands::watch::execute(&batch, interval, cli.format)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("rate_scout=debug,rate_scout_core=debug,rate_scout_browser=debug")
    } else {
        EnvFilter::new("rate_scout=info,rate_scout_core=info,rate_scout_browser=info")
    };

    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
