pub mod accounts;
pub mod backup;
pub mod dashboard;
pub mod init;
pub mod quick;
pub mod record;
pub mod report;
pub mod status;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::open_ledger;
use crate::error::{LedgerError, Result};
use crate::ledger::TIMESTAMP_FORMAT;
use crate::settings::{load_settings, Settings};

/// Load settings and open the initialized ledger.
pub(crate) fn open() -> Result<(Settings, Connection)> {
    let settings = load_settings();
    let conn = open_ledger(&settings.data_path())?;
    Ok((settings, conn))
}

/// Accept `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).
pub(crate) fn parse_timestamp(value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(raw) = value.map(str::trim) else {
        return Ok(None);
    };
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(Some(ts));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| LedgerError::InvalidDate(raw.to_string()))
}

#[derive(Parser)]
#[command(name = "dompet", about = "Personal finance ledger with savings and charity buckets.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the ledger.
    Init {
        /// Path for ledger data (default: ~/Documents/dompet)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Open the interactive dashboard (default when no command is given).
    Dashboard {
        /// Month to show: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// List accounts and balances.
    Accounts,
    /// Record an income or expense.
    Add {
        /// Account name, e.g. BRI
        account: String,
        /// Amount in Rupiah
        amount: f64,
        /// Income or Expense
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Timestamp: YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// Move money between two accounts.
    Transfer {
        /// Source account name
        from: String,
        /// Destination account name
        to: String,
        /// Amount in Rupiah
        amount: f64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Purpose tag: general, charity, saving
        #[arg(long, default_value = "general")]
        purpose: String,
        /// Timestamp: YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// Put money into the charity (Sedekah) or savings (Tabungan) bucket.
    SetAside {
        /// charity or saving
        purpose: String,
        /// Source account name
        from: String,
        /// Amount in Rupiah
        amount: f64,
        #[arg(long)]
        description: Option<String>,
        /// Timestamp: YYYY-MM-DD or YYYY-MM-DD HH:MM:SS (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// Canned one-shot transactions.
    Quick {
        #[command(subcommand)]
        command: QuickCommands,
    },
    /// Show recent transactions.
    History {
        /// Number of transactions (default from settings)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Daily income and expense totals for a month.
    Summary {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Activity flags for a single day.
    Activity {
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the activity calendar for a month.
    Calendar {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Verify stored balances against posted transactions.
    Check,
    /// Show current database and summary statistics.
    Status,
    /// Snapshot the ledger after checking its balances.
    Backup {
        /// Output path (default: <data_dir>/backups/dompet-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
        /// Write the snapshot even when balances have drifted
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum QuickCommands {
    /// Record the KIP stipend disbursement.
    Kip,
    /// Give the configured charity amount.
    Sedekah {
        /// Source account name
        #[arg(long)]
        from: String,
    },
    /// Save the configured saving amount.
    Menabung {
        /// Source account name
        #[arg(long)]
        from: String,
    },
}
