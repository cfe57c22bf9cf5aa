use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::{LedgerError, Result};
use crate::models::{Purpose, Transaction};

// ---------------------------------------------------------------------------
// Recent transactions
// ---------------------------------------------------------------------------

/// Newest transactions first, joined with their account name.
pub fn recent_transactions(conn: &Connection, limit: usize) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.timestamp, t.type, a.name, t.amount, \
         t.category, t.description, t.purpose, t.transfer_id \
         FROM transactions t JOIN accounts a ON t.account_id = a.id \
         ORDER BY t.timestamp DESC, t.id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                kind: row.get(2)?,
                account_name: row.get(3)?,
                amount: row.get(4)?,
                category: row.get(5)?,
                description: row.get(6)?,
                purpose: row.get(7)?,
                transfer_id: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Daily summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day: u32,
    pub income: f64,
    pub expense: f64,
}

/// Per-day income and expense totals for one month. Days without any
/// transaction are absent.
pub fn daily_summary(conn: &Connection, year: i32, month: u32) -> Result<Vec<DaySummary>> {
    if !(1..=12).contains(&month) {
        return Err(LedgerError::InvalidMonth(month));
    }
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%d', timestamp) AS INTEGER) AS day, \
         SUM(CASE WHEN type = 'Income' THEN amount ELSE 0 END), \
         SUM(CASE WHEN type = 'Expense' THEN amount ELSE 0 END) \
         FROM transactions \
         WHERE strftime('%Y-%m', timestamp) = ?1 \
         GROUP BY day ORDER BY day",
    )?;
    let rows = stmt
        .query_map([format!("{year:04}-{month:02}")], |row| {
            Ok(DaySummary {
                day: row.get(0)?,
                income: row.get(1)?,
                expense: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Activity flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityFlags {
    /// Charity transfer landed on the charity bucket.
    pub charity: bool,
    /// Saving transfer landed on the savings bucket.
    pub saving: bool,
    pub any: bool,
}

/// Calendar heat level for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heat {
    None,
    Activity,
    Saving,
    Charity,
    Both,
}

impl Heat {
    pub fn label(self) -> &'static str {
        match self {
            Heat::None => "none",
            Heat::Activity => "red",
            Heat::Saving => "yellow",
            Heat::Charity => "blue",
            Heat::Both => "green",
        }
    }
}

impl ActivityFlags {
    pub fn heat(self) -> Heat {
        match (self.charity, self.saving, self.any) {
            (true, true, _) => Heat::Both,
            (true, false, _) => Heat::Charity,
            (false, true, _) => Heat::Saving,
            (false, false, true) => Heat::Activity,
            (false, false, false) => Heat::None,
        }
    }
}

fn bucket_income_on(conn: &Connection, date: &str, purpose: Purpose) -> Result<bool> {
    let Some(bucket) = purpose.bucket_account() else {
        return Ok(false);
    };
    let found: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM transactions t JOIN accounts a ON t.account_id = a.id \
         WHERE date(t.timestamp) = ?1 AND t.purpose = ?2 AND t.type = 'Income' AND a.name = ?3)",
        rusqlite::params![date, purpose.as_str(), bucket],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn activity_for_date(conn: &Connection, date: NaiveDate) -> Result<ActivityFlags> {
    let day = date.format("%Y-%m-%d").to_string();
    let any: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM transactions WHERE date(timestamp) = ?1)",
        [&day],
        |row| row.get(0),
    )?;
    Ok(ActivityFlags {
        charity: bucket_income_on(conn, &day, Purpose::Charity)?,
        saving: bucket_income_on(conn, &day, Purpose::Saving)?,
        any,
    })
}

// ---------------------------------------------------------------------------
// Status counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCounts {
    pub accounts: i64,
    pub transactions: i64,
    pub transfers: i64,
}

pub fn counts(conn: &Connection) -> Result<LedgerCounts> {
    let accounts: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
    let transactions: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let transfers: i64 = conn.query_row(
        "SELECT count(DISTINCT transfer_id) FROM transactions WHERE transfer_id IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(LedgerCounts {
        accounts,
        transactions,
        transfers,
    })
}
