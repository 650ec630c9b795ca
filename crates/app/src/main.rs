use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use taxport_core::SystemClock;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{ConvertArgs, SummaryArgs};
use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "taxport",
    version,
    about = "Convert accounting CSV exports to TXF and summarize them"
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file [default: platform config dir/taxport/config.toml]
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a TXF file for tax software
    Convert(ConvertArgs),
    /// Print totals, monthly and category breakdowns
    Summary(SummaryArgs),
    /// List the category and TXF code tables in use
    Categories,
}

/// `RUST_LOG` wins; otherwise the level follows `-v`. Logs go to stderr so
/// `--json` output stays clean.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    let clock = SystemClock;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Convert(args) => commands::convert(&args, &config, &clock, &mut out),
        Command::Summary(args) => commands::summary(&args, &config, &clock, &mut out),
        Command::Categories => commands::categories(&config, &mut out),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
