mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use commands::loan::{PaymentArgs, ScheduleArgs};
use commands::recast::{EvaluateArgs, ExportArgs};
use commands::scenarios::CompareArgs;

/// Lump-sum paydown and mortgage recast calculator
#[derive(Parser)]
#[command(
    name = "recast",
    version,
    about = "Lump-sum paydown and mortgage recast calculator",
    long_about = "Evaluates paying down a fixed-rate mortgage and asking the lender to \
                  recast it: new payment, interest saved, break-even months, and the \
                  month-by-month schedules before and after, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment for a loan
    Payment(PaymentArgs),
    /// Month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Evaluate a lump-sum paydown followed by a recast
    Evaluate(EvaluateArgs),
    /// Write the original and recast schedules to a two-sheet workbook
    Export(ExportArgs),
    /// Compare several recast scenarios side by side
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Logs go to stderr so stdout stays parseable; `RUST_LOG` overrides the level.
fn init_tracing(log_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = if log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Evaluate(args) => commands::recast::run_evaluate(args),
        Commands::Export(args) => commands::recast::run_export(args),
        Commands::Compare(args) => commands::scenarios::run_compare(args),
        Commands::Version => {
            println!("recast {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
