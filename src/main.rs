mod calendar;
mod cli;
mod db;
mod error;
mod fmt;
mod ledger;
mod models;
mod reports;
mod settings;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// `RUST_LOG` wins over the configured level. Logs go to stderr so they
/// never mix with command output.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dompet={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&settings::load_settings().log_level);

    let result = match cli.command {
        None => cli::dashboard::run(None),
        Some(command) => match command {
            Commands::Init { data_dir } => cli::init::run(data_dir),
            Commands::Dashboard { month } => cli::dashboard::run(month),
            Commands::Accounts => cli::accounts::list(),
            Commands::Add {
                account,
                amount,
                kind,
                category,
                description,
                date,
            } => cli::record::add(&account, amount, &kind, category, description, date.as_deref()),
            Commands::Transfer {
                from,
                to,
                amount,
                category,
                description,
                purpose,
                date,
            } => cli::record::transfer(
                &from,
                &to,
                amount,
                category,
                description,
                &purpose,
                date.as_deref(),
            ),
            Commands::SetAside {
                purpose,
                from,
                amount,
                description,
                date,
            } => cli::record::set_aside(&purpose, &from, amount, description, date.as_deref()),
            Commands::Quick { command } => cli::quick::run(command),
            Commands::History { limit } => cli::report::history(limit),
            Commands::Summary { month } => cli::report::summary(month),
            Commands::Activity { date } => cli::report::activity(date),
            Commands::Calendar { month } => cli::report::calendar(month),
            Commands::Check => cli::report::check(),
            Commands::Status => cli::status::run(),
            Commands::Backup { output, force } => cli::backup::run(output, force),
        },
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
