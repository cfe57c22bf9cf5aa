use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Cannot transfer from {0} to itself")]
    SameAccount(String),

    #[error("Unknown transaction kind: {0} (expected Income or Expense)")]
    UnknownKind(String),

    #[error("Unknown purpose: {0} (expected general, charity or saving)")]
    UnknownPurpose(String),

    #[error("A {purpose} transfer must go to {bucket}, not {account}")]
    PurposeMismatch {
        purpose: String,
        bucket: String,
        account: String,
    },

    #[error("Balance drift on {0} account(s); run `dompet check` for details")]
    BalanceDrift(usize),

    #[error("Backup at {0} does not match the ledger")]
    BackupMismatch(String),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
