//! Fintrack CLI - personal finance from your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{categories, dashboard, demo, open, record, signin, whoami};

/// Fintrack - track income and expenses from your terminal
#[derive(Parser)]
#[command(name = "ft", version, about, long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Navigate to a client location, applying the sign-in guard
    Open {
        /// Location such as /dashboard?month=5
        location: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in with Google and confirm the session
    Signin {
        /// Session cookie copied from the browser after sign-in
        #[arg(long)]
        cookie: Option<String>,
        /// Where to continue afterwards (path or sign-in location)
        #[arg(long)]
        redirect: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored session
    Signout,

    /// Record or update incomes
    Income {
        #[command(subcommand)]
        command: record::IncomeCommands,
    },

    /// Record or update expenses
    Expense {
        #[command(subcommand)]
        command: record::ExpenseCommands,
    },

    /// Search categories by name
    Categories {
        /// Name to search for
        name: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show totals, recent activity and spending by category
    Dashboard {
        /// Number of recent transactions to show
        #[arg(long, default_value_t = 5)]
        recent: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FINTRACK_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Whoami { json } => whoami::run(json).await,
        Commands::Open { location, json } => open::run(&location, json).await,
        Commands::Signin { cookie, redirect, json } => signin::run(cookie, redirect, json).await,
        Commands::Signout => signin::run_signout(),
        Commands::Income { command } => record::run_income(command).await,
        Commands::Expense { command } => record::run_expense(command).await,
        Commands::Categories { name, json } => categories::run(name, json).await,
        Commands::Dashboard { recent, json } => dashboard::run(recent, json).await,
        Commands::Demo { command } => demo::run(command),
    }
}
