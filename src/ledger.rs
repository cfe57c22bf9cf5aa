use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::models::{Account, Purpose, TransactionKind};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single income or expense posting.
#[derive(Debug, Clone)]
pub struct Posting {
    pub kind: TransactionKind,
    pub account_id: i64,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub purpose: Purpose,
    /// Defaults to the current local time.
    pub timestamp: Option<NaiveDateTime>,
}

/// Money moved between two accounts, posted as an expense leg on the
/// source and an income leg on the destination.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub purpose: Purpose,
    pub timestamp: Option<NaiveDateTime>,
}

/// Ids of a committed transfer and the resolved names of both accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transfer_id: i64,
    pub debit_id: i64,
    pub credit_id: i64,
    pub from: String,
    pub to: String,
}

/// Account whose stored balance disagrees with its posted transactions.
#[derive(Debug, Clone)]
pub struct BalanceDrift {
    pub account: String,
    pub stored: f64,
    pub computed: f64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn account_from_row(row: &rusqlite::Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        is_virtual: row.get(3)?,
    })
}

/// Real accounts first, then virtual, each in creation order.
pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, balance, is_virtual FROM accounts ORDER BY is_virtual, id",
    )?;
    let rows = stmt
        .query_map([], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Account> {
    conn.query_row(
        "SELECT id, name, balance, is_virtual FROM accounts WHERE id = ?1",
        [id],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::UnknownAccount(format!("#{id}")))
}

/// Look up an account by display name, ignoring case.
pub fn find_account(conn: &Connection, name: &str) -> Result<Account> {
    conn.query_row(
        "SELECT id, name, balance, is_virtual FROM accounts WHERE name = ?1 COLLATE NOCASE",
        [name.trim()],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::UnknownAccount(name.to_string()))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

fn stamp(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .unwrap_or_else(|| chrono::Local::now().naive_local())
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn leg_description(prefix: &str, counterpart: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("{prefix} {counterpart}: {d}"),
        None => format!("{prefix} {counterpart}"),
    }
}

/// Insert one transaction row and adjust its account balance. Returns the
/// new transaction id.
pub fn record_transaction(conn: &Connection, posting: &Posting) -> Result<i64> {
    if let Err(e) = validate_amount(posting.amount) {
        tracing::warn!(amount = posting.amount, "rejected posting");
        return Err(e);
    }
    let account = get_account(conn, posting.account_id)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO transactions (timestamp, type, account_id, amount, category, description, purpose) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            stamp(posting.timestamp),
            posting.kind.as_str(),
            account.id,
            posting.amount,
            posting.category,
            posting.description,
            posting.purpose.as_str(),
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        rusqlite::params![posting.kind.signed(posting.amount), account.id],
    )?;
    tx.commit()?;

    tracing::info!(
        id,
        kind = %posting.kind,
        account = %account.name,
        amount = posting.amount,
        "recorded transaction"
    );
    Ok(id)
}

/// Post both legs of a transfer and move the balances. Either all four
/// writes land or none do.
pub fn record_transfer(conn: &Connection, transfer: &Transfer) -> Result<TransferReceipt> {
    validate_amount(transfer.amount)?;
    let from = get_account(conn, transfer.from_account_id)?;
    let to = get_account(conn, transfer.to_account_id)?;
    if from.id == to.id {
        tracing::warn!(account = %from.name, "rejected transfer to same account");
        return Err(LedgerError::SameAccount(from.name));
    }
    if let Some(bucket) = transfer.purpose.bucket_account() {
        if !to.name.eq_ignore_ascii_case(bucket) {
            tracing::warn!(purpose = %transfer.purpose, account = %to.name, "rejected transfer outside bucket");
            return Err(LedgerError::PurposeMismatch {
                purpose: transfer.purpose.to_string(),
                bucket: bucket.to_string(),
                account: to.name,
            });
        }
    }

    let timestamp = stamp(transfer.timestamp);
    let description = transfer.description.as_deref();

    let tx = conn.unchecked_transaction()?;
    let transfer_id: i64 = tx.query_row(
        "SELECT COALESCE(MAX(transfer_id), 0) + 1 FROM transactions",
        [],
        |row| row.get(0),
    )?;

    let insert_leg = |kind: TransactionKind, account_id: i64, text: String| -> Result<i64> {
        tx.execute(
            "INSERT INTO transactions \
             (timestamp, type, account_id, amount, category, description, purpose, transfer_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                timestamp,
                kind.as_str(),
                account_id,
                transfer.amount,
                transfer.category,
                text,
                transfer.purpose.as_str(),
                transfer_id,
            ],
        )?;
        Ok(tx.last_insert_rowid())
    };

    let debit_id = insert_leg(
        TransactionKind::Expense,
        from.id,
        leg_description("Transfer to", &to.name, description),
    )?;
    let credit_id = insert_leg(
        TransactionKind::Income,
        to.id,
        leg_description("Transfer from", &from.name, description),
    )?;

    tx.execute(
        "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2",
        rusqlite::params![transfer.amount, from.id],
    )?;
    tx.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        rusqlite::params![transfer.amount, to.id],
    )?;
    tx.commit()?;

    tracing::info!(
        transfer_id,
        from = %from.name,
        to = %to.name,
        amount = transfer.amount,
        purpose = %transfer.purpose,
        "recorded transfer"
    );
    Ok(TransferReceipt {
        transfer_id,
        debit_id,
        credit_id,
        from: from.name,
        to: to.name,
    })
}

/// Compare each stored balance against the signed sum of its transactions.
pub fn verify_balances(conn: &Connection) -> Result<Vec<BalanceDrift>> {
    let mut stmt = conn.prepare(
        "SELECT a.name, a.balance, \
         COALESCE(SUM(CASE WHEN t.type = 'Income' THEN t.amount ELSE -t.amount END), 0) \
         FROM accounts a LEFT JOIN transactions t ON t.account_id = a.id \
         GROUP BY a.id ORDER BY a.is_virtual, a.id",
    )?;
    let drift: Vec<BalanceDrift> = stmt
        .query_map([], |row| {
            Ok(BalanceDrift {
                account: row.get(0)?,
                stored: row.get(1)?,
                computed: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|d| (d.stored - d.computed).abs() >= 0.005)
        .collect();
    for d in &drift {
        tracing::warn!(account = %d.account, stored = d.stored, computed = d.computed, "balance drift");
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{account_id, balance, test_db, txn_count};

    fn posting(kind: TransactionKind, account_id: i64, amount: f64) -> Posting {
        Posting {
            kind,
            account_id,
            amount,
            category: None,
            description: None,
            purpose: Purpose::General,
            timestamp: None,
        }
    }

    fn transfer(from: i64, to: i64, amount: f64) -> Transfer {
        Transfer {
            from_account_id: from,
            to_account_id: to,
            amount,
            category: None,
            description: None,
            purpose: Purpose::General,
            timestamp: None,
        }
    }

    #[test]
    fn test_list_accounts_real_first() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO accounts (name, is_virtual) VALUES ('Darurat', 1)", []).unwrap();
        conn.execute("INSERT INTO accounts (name, is_virtual) VALUES ('OVO', 0)", []).unwrap();
        let names: Vec<String> = list_accounts(&conn).unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            ["BRI", "BTN", "Dana", "GoPay", "Tunai", "OVO", "Sedekah", "Tabungan", "Darurat"]
        );
    }

    #[test]
    fn test_find_account_ignores_case() {
        let (_dir, conn) = test_db();
        let acct = find_account(&conn, "gopay").unwrap();
        assert_eq!(acct.name, "GoPay");
        assert!(!acct.is_virtual);
        assert!(matches!(find_account(&conn, "Mandiri"), Err(LedgerError::UnknownAccount(_))));
    }

    #[test]
    fn test_income_and_expense_adjust_balance() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        record_transaction(&conn, &posting(TransactionKind::Income, bri, 1000.0)).unwrap();
        record_transaction(&conn, &posting(TransactionKind::Expense, bri, 250.0)).unwrap();
        record_transaction(&conn, &posting(TransactionKind::Income, bri, 75.5)).unwrap();
        assert_eq!(balance(&conn, "BRI"), 825.5);
        assert_eq!(txn_count(&conn), 3);
    }

    #[test]
    fn test_expense_can_overdraw() {
        let (_dir, conn) = test_db();
        let tunai = account_id(&conn, "Tunai");
        record_transaction(&conn, &posting(TransactionKind::Expense, tunai, 20000.0)).unwrap();
        assert_eq!(balance(&conn, "Tunai"), -20000.0);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = record_transaction(&conn, &posting(TransactionKind::Income, bri, amount));
            assert!(matches!(err, Err(LedgerError::InvalidAmount(_))));
        }
        assert_eq!(txn_count(&conn), 0);
        assert_eq!(balance(&conn, "BRI"), 0.0);
    }

    #[test]
    fn test_rejects_unknown_account() {
        let (_dir, conn) = test_db();
        let err = record_transaction(&conn, &posting(TransactionKind::Income, 999, 10.0));
        assert!(matches!(err, Err(LedgerError::UnknownAccount(_))));
        assert_eq!(txn_count(&conn), 0);
    }

    #[test]
    fn test_transfer_moves_balance_and_posts_two_legs() {
        let (_dir, conn) = test_db();
        let btn = account_id(&conn, "BTN");
        let sedekah = account_id(&conn, "Sedekah");
        record_transaction(&conn, &posting(TransactionKind::Income, btn, 5_700_000.0)).unwrap();
        assert_eq!(balance(&conn, "BTN"), 5_700_000.0);
        assert_eq!(txn_count(&conn), 1);

        let receipt = record_transfer(&conn, &transfer(btn, sedekah, 1000.0)).unwrap();
        assert_eq!(balance(&conn, "BTN"), 5_699_000.0);
        assert_eq!(balance(&conn, "Sedekah"), 1000.0);
        assert_eq!(txn_count(&conn), 3);

        let legs: Vec<(i64, String, i64, f64, String, Option<i64>)> = conn
            .prepare(
                "SELECT id, type, account_id, amount, timestamp, transfer_id \
                 FROM transactions WHERE transfer_id IS NOT NULL ORDER BY id",
            )
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!((legs[0].0, legs[0].1.as_str(), legs[0].2), (receipt.debit_id, "Expense", btn));
        assert_eq!((legs[1].0, legs[1].1.as_str(), legs[1].2), (receipt.credit_id, "Income", sedekah));
        assert_eq!(legs[0].3, legs[1].3);
        assert_eq!(legs[0].4, legs[1].4);
        assert_eq!(legs[0].5, Some(receipt.transfer_id));
        assert_eq!(legs[1].5, Some(receipt.transfer_id));
    }

    #[test]
    fn test_transfer_descriptions_name_counterpart() {
        let (_dir, conn) = test_db();
        let dana = account_id(&conn, "Dana");
        let tabungan = account_id(&conn, "Tabungan");
        let mut t = transfer(dana, tabungan, 5000.0);
        t.description = Some("Menabung via Aksi Cepat".to_string());
        record_transfer(&conn, &t).unwrap();
        record_transfer(&conn, &transfer(tabungan, dana, 100.0)).unwrap();

        let descriptions: Vec<String> = conn
            .prepare("SELECT description FROM transactions ORDER BY id")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            descriptions,
            [
                "Transfer to Tabungan: Menabung via Aksi Cepat",
                "Transfer from Dana: Menabung via Aksi Cepat",
                "Transfer to Dana",
                "Transfer from Tabungan",
            ]
        );
    }

    #[test]
    fn test_transfer_ids_are_distinct() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        let gopay = account_id(&conn, "GoPay");
        let first = record_transfer(&conn, &transfer(bri, gopay, 10.0)).unwrap();
        let second = record_transfer(&conn, &transfer(gopay, bri, 10.0)).unwrap();
        assert_ne!(first.transfer_id, second.transfer_id);
        assert_eq!(balance(&conn, "BRI"), 0.0);
        assert_eq!(balance(&conn, "GoPay"), 0.0);
    }

    #[test]
    fn test_rejected_transfer_changes_nothing() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        assert!(matches!(
            record_transfer(&conn, &transfer(bri, bri, 10.0)),
            Err(LedgerError::SameAccount(_))
        ));
        assert!(matches!(
            record_transfer(&conn, &transfer(bri, 42, 10.0)),
            Err(LedgerError::UnknownAccount(_))
        ));
        assert!(matches!(
            record_transfer(&conn, &transfer(bri, 2, -1.0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert_eq!(txn_count(&conn), 0);
        assert!(list_accounts(&conn).unwrap().iter().all(|a| a.balance == 0.0));
    }

    #[test]
    fn test_purpose_must_target_its_bucket() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        let dana = account_id(&conn, "Dana");
        let sedekah = account_id(&conn, "Sedekah");
        let tabungan = account_id(&conn, "Tabungan");

        let mut t = transfer(bri, dana, 5.0);
        t.purpose = Purpose::Charity;
        assert!(matches!(
            record_transfer(&conn, &t),
            Err(LedgerError::PurposeMismatch { bucket, account, .. }) if bucket == "Sedekah" && account == "Dana"
        ));
        t.to_account_id = tabungan;
        assert!(matches!(record_transfer(&conn, &t), Err(LedgerError::PurposeMismatch { .. })));
        assert_eq!(txn_count(&conn), 0);

        t.to_account_id = sedekah;
        let receipt = record_transfer(&conn, &t).unwrap();
        assert_eq!((receipt.from.as_str(), receipt.to.as_str()), ("BRI", "Sedekah"));
        assert_eq!(balance(&conn, "Sedekah"), 5.0);
    }

    #[test]
    fn test_failed_transfer_rolls_back() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        let btn = account_id(&conn, "BTN");
        // Fail the second balance update after both legs are inserted.
        conn.execute_batch(&format!(
            "CREATE TRIGGER fail_credit BEFORE UPDATE OF balance ON accounts \
             WHEN NEW.id = {btn} BEGIN SELECT RAISE(ABORT, 'credit failed'); END;"
        ))
        .unwrap();

        let result = record_transfer(&conn, &transfer(bri, btn, 500.0));
        assert!(matches!(result, Err(LedgerError::Db(_))));
        assert_eq!(txn_count(&conn), 0);
        assert_eq!(balance(&conn, "BRI"), 0.0);
        assert_eq!(balance(&conn, "BTN"), 0.0);
    }

    #[test]
    fn test_verify_balances_after_mixed_activity() {
        let (_dir, conn) = test_db();
        let bri = account_id(&conn, "BRI");
        let tabungan = account_id(&conn, "Tabungan");
        record_transaction(&conn, &posting(TransactionKind::Income, bri, 300.0)).unwrap();
        record_transfer(&conn, &transfer(bri, tabungan, 120.0)).unwrap();
        record_transaction(&conn, &posting(TransactionKind::Expense, tabungan, 20.0)).unwrap();
        assert!(verify_balances(&conn).unwrap().is_empty());

        conn.execute("UPDATE accounts SET balance = 1 WHERE id = ?1", [bri]).unwrap();
        let drift = verify_balances(&conn).unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].account, "BRI");
        assert_eq!(drift[0].computed, 180.0);
    }
}
