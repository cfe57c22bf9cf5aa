use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "dompet.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    balance REAL NOT NULL DEFAULT 0,
    is_virtual INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    type TEXT NOT NULL CHECK (type IN ('Income', 'Expense')),
    account_id INTEGER NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    category TEXT,
    description TEXT,
    purpose TEXT NOT NULL DEFAULT 'general',
    transfer_id INTEGER,
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);
CREATE INDEX IF NOT EXISTS idx_transactions_transfer ON transactions(transfer_id);
";

// (name, is_virtual)
pub const SEED_ACCOUNTS: &[(&str, bool)] = &[
    ("BRI", false),
    ("BTN", false),
    ("Dana", false),
    ("GoPay", false),
    ("Tunai", false),
    ("Sedekah", true),
    ("Tabungan", true),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    tracing::debug!(path = %db_path.display(), "opened ledger database");
    Ok(conn)
}

/// Create the tables and seed the default accounts when none exist.
/// The count check and the inserts share one transaction.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let tx = conn.unchecked_transaction()?;
    let count: i64 = tx.query_row("SELECT count(*) FROM accounts", [], |row| row.get(0))?;
    if count == 0 {
        for (name, is_virtual) in SEED_ACCOUNTS {
            tx.execute(
                "INSERT INTO accounts (name, balance, is_virtual) VALUES (?1, 0, ?2)",
                rusqlite::params![name, is_virtual],
            )?;
        }
        tracing::info!(accounts = SEED_ACCOUNTS.len(), "seeded default accounts");
    }
    tx.commit()?;
    Ok(())
}

/// Open the ledger under `data_dir` and make sure it is initialized.
pub fn open_ledger(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILE))?;
    init_db(&conn)?;
    Ok(conn)
}


#[cfg(test)]
mod tests {
    use super::test_support::test_db;
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["accounts", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_seed_accounts_start_at_zero() {
        let (_dir, conn) = test_db();
        let rows: Vec<(String, f64, bool)> = conn
            .prepare("SELECT name, balance, is_virtual FROM accounts ORDER BY id")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, ["BRI", "BTN", "Dana", "GoPay", "Tunai", "Sedekah", "Tabungan"]);
        assert!(rows.iter().all(|(_, b, _)| *b == 0.0));
        let virtuals: Vec<&str> = rows.iter().filter(|r| r.2).map(|r| r.0.as_str()).collect();
        assert_eq!(virtuals, ["Sedekah", "Tabungan"]);
    }

    #[test]
    fn test_schema_rejects_unknown_kind() {
        let (_dir, conn) = test_db();
        let result = conn.execute(
            "INSERT INTO transactions (type, account_id, amount) VALUES ('Transfer', 1, 10.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_open_ledger_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        open_ledger(&data_dir).unwrap();
        assert!(data_dir.join(DB_FILE).exists());
    }
}
