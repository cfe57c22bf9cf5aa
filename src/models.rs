use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    pub is_virtual: bool,
}

/// Posting direction of a transaction row. Stored as its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// Signed effect of `amount` on the account balance.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(LedgerError::UnknownKind(s.to_string())),
        }
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
    }
}

/// What a transaction is for. Charity and saving transfers land on their
/// virtual account and drive the calendar heat-map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Purpose {
    #[default]
    General,
    Charity,
    Saving,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::General => "general",
            Purpose::Charity => "charity",
            Purpose::Saving => "saving",
        }
    }

    /// Virtual account that receives transfers with this purpose.
    pub fn bucket_account(self) -> Option<&'static str> {
        match self {
            Purpose::General => None,
            Purpose::Charity => Some("Sedekah"),
            Purpose::Saving => Some("Tabungan"),
        }
    }

    /// Category label written on transfers made for this purpose.
    pub fn category_label(self) -> Option<&'static str> {
        match self {
            Purpose::General => None,
            Purpose::Charity => Some("Sedekah"),
            Purpose::Saving => Some("Menabung"),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Purpose::General),
            "charity" => Ok(Purpose::Charity),
            "saving" => Ok(Purpose::Saving),
            _ => Err(LedgerError::UnknownPurpose(s.to_string())),
        }
    }
}

impl FromSql for Purpose {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
    }
}

/// A transaction row joined with its account name.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub timestamp: String,
    pub kind: TransactionKind,
    pub account_name: String,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub purpose: Purpose,
    pub transfer_id: Option<i64>,
}

impl Transaction {
    pub fn is_transfer_leg(&self) -> bool {
        self.transfer_id.is_some()
    }
}
