//! Payroll command line.
//!
//! Usage:
//!   payroll payments -d DIR -y YEAR -m MONTH   # run and store a month
//!   payroll revert -d DIR -y YEAR -m MONTH     # delete a month's results
//!   payroll fs3 -d DIR -y YEAR                 # per-employee annual summaries
//!   payroll fs5 -d DIR -y YEAR -m MONTH        # monthly withholding return
//!   payroll fs7 -d DIR -y YEAR                 # annual reconciliation
//!   payroll serve -d DIR -y YEAR               # HTTP API

mod commands;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "payroll", version, about = "Monthly payroll and FS3/FS5/FS7 reports")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct YearArgs {
    /// Payroll data directory
    #[arg(short = 'd', long = "data-dir", default_value = "data")]
    data_dir: PathBuf,

    /// Tax year
    #[arg(short, long)]
    year: i32,
}

#[derive(Args)]
struct MonthArgs {
    #[command(flatten)]
    base: YearArgs,

    /// Month (1-12)
    #[arg(short, long)]
    month: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and store the payments of a month
    Payments(MonthArgs),
    /// Delete the stored payments of a month
    Revert(MonthArgs),
    /// Write the FS3 summary of every employee for a year
    Fs3(YearArgs),
    /// Write the FS5 return of a month
    Fs5(MonthArgs),
    /// Write the FS7 reconciliation of a year
    Fs7(YearArgs),
    /// Serve the HTTP API for a year
    Serve {
        #[command(flatten)]
        base: YearArgs,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Payments(args) => {
            commands::payments(&args.base.data_dir, args.base.year, args.month)
        }
        Commands::Revert(args) => {
            commands::revert(&args.base.data_dir, args.base.year, args.month)
        }
        Commands::Fs3(args) => commands::fs3(&args.data_dir, args.year),
        Commands::Fs5(args) => commands::fs5(&args.base.data_dir, args.base.year, args.month),
        Commands::Fs7(args) => commands::fs7(&args.data_dir, args.year),
        Commands::Serve { base, addr } => commands::serve(&base.data_dir, base.year, addr).await,
    }
}
