use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;

use crate::error::{LedgerError, Result};
use crate::fmt::format_bytes;
use crate::ledger::verify_balances;
use crate::reports::{counts, LedgerCounts};

pub fn run(output: Option<String>, force: bool) -> Result<()> {
    let (settings, conn) = super::open()?;

    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let backups_dir = settings.data_path().join("backups");
            std::fs::create_dir_all(&backups_dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            backups_dir.join(format!("dompet-{stamp}.db"))
        }
    };

    let snap = snapshot(&conn, &dest_path, force)?;
    println!("Backup saved to {}", dest_path.display());
    println!(
        "Contains {} accounts, {} transactions, {} transfers ({})",
        snap.counts.accounts,
        snap.counts.transactions,
        snap.counts.transfers,
        format_bytes(snap.size)
    );
    Ok(())
}

pub(crate) struct Snapshot {
    pub counts: LedgerCounts,
    pub size: u64,
}

/// Copy a ledger whose balances agree with its rows to `dest`, then read the
/// copy back and require the same counts. `force` skips the balance gate.
pub(crate) fn snapshot(conn: &Connection, dest: &Path, force: bool) -> Result<Snapshot> {
    let drift = verify_balances(conn)?;
    if !drift.is_empty() {
        if !force {
            return Err(LedgerError::BalanceDrift(drift.len()));
        }
        tracing::warn!(accounts = drift.len(), "snapshotting ledger with balance drift");
    }

    let expected = counts(conn)?;
    let mut copy = Connection::open(dest)?;
    Backup::new(conn, &mut copy)?.run_to_completion(100, Duration::from_millis(10), None)?;
    if counts(&copy)? != expected {
        return Err(LedgerError::BackupMismatch(dest.display().to_string()));
    }

    let size = std::fs::metadata(dest)?.len();
    tracing::info!(path = %dest.display(), transactions = expected.transactions, size, "backup written");
    Ok(Snapshot { counts: expected, size })
}
