use rusqlite::Connection;

use crate::error::{LedgerError, Result};
use crate::fmt::rupiah;
use crate::ledger::{find_account, record_transaction, record_transfer, Posting, Transfer, TransferReceipt};
use crate::models::{Purpose, TransactionKind};

pub fn add(
    account: &str,
    amount: f64,
    kind: &str,
    category: Option<String>,
    description: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let kind: TransactionKind = kind.parse()?;
    let timestamp = super::parse_timestamp(date)?;
    let (_, conn) = super::open()?;
    let acct = find_account(&conn, account)?;

    record_transaction(
        &conn,
        &Posting {
            kind,
            account_id: acct.id,
            amount,
            category,
            description,
            purpose: Purpose::General,
            timestamp,
        },
    )?;
    println!("{kind} of {} recorded on {}", rupiah(amount), acct.name);
    Ok(())
}

pub fn transfer(
    from: &str,
    to: &str,
    amount: f64,
    category: Option<String>,
    description: Option<String>,
    purpose: &str,
    date: Option<&str>,
) -> Result<()> {
    let purpose: Purpose = purpose.parse()?;
    let timestamp = super::parse_timestamp(date)?;
    let (_, conn) = super::open()?;
    let receipt = move_between(&conn, from, to, amount, category, description, purpose, timestamp)?;
    println!(
        "Transferred {} from {} to {} (transfer #{}, legs #{}/#{})",
        rupiah(amount),
        receipt.from,
        receipt.to,
        receipt.transfer_id,
        receipt.debit_id,
        receipt.credit_id
    );
    Ok(())
}

/// Transfer into the virtual bucket that belongs to `purpose`.
pub fn set_aside(purpose: &str, from: &str, amount: f64, description: Option<String>, date: Option<&str>) -> Result<()> {
    let purpose: Purpose = purpose.parse()?;
    let timestamp = super::parse_timestamp(date)?;
    let (_, conn) = super::open()?;
    to_bucket(&conn, purpose, from, amount, description, timestamp)?;
    Ok(())
}

/// Shared by `set-aside` and the quick actions.
pub(crate) fn to_bucket(
    conn: &Connection,
    purpose: Purpose,
    from: &str,
    amount: f64,
    description: Option<String>,
    timestamp: Option<chrono::NaiveDateTime>,
) -> Result<TransferReceipt> {
    let bucket = purpose
        .bucket_account()
        .ok_or_else(|| LedgerError::UnknownPurpose(purpose.to_string()))?;
    let category = purpose.category_label().map(String::from);
    let receipt = move_between(conn, from, bucket, amount, category, description, purpose, timestamp)?;
    println!(
        "{} of {} moved from {} to {}",
        label(purpose),
        rupiah(amount),
        receipt.from,
        receipt.to
    );
    Ok(receipt)
}

fn label(purpose: Purpose) -> &'static str {
    match purpose {
        Purpose::Charity => "Sedekah",
        Purpose::Saving => "Saving",
        Purpose::General => "Transfer",
    }
}

#[allow(clippy::too_many_arguments)]
fn move_between(
    conn: &Connection,
    from: &str,
    to: &str,
    amount: f64,
    category: Option<String>,
    description: Option<String>,
    purpose: Purpose,
    timestamp: Option<chrono::NaiveDateTime>,
) -> Result<TransferReceipt> {
    let source = find_account(conn, from)?;
    let destination = find_account(conn, to)?;
    record_transfer(
        conn,
        &Transfer {
            from_account_id: source.id,
            to_account_id: destination.id,
            amount,
            category,
            description,
            purpose,
            timestamp,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{balance, test_db, txn_count};

    #[test]
    fn test_to_bucket_routes_by_purpose() {
        let (_dir, conn) = test_db();
        to_bucket(&conn, Purpose::Charity, "btn", 1000.0, None, None).unwrap();
        to_bucket(&conn, Purpose::Saving, "BTN", 5000.0, None, None).unwrap();
        assert_eq!(balance(&conn, "BTN"), -6000.0);
        assert_eq!(balance(&conn, "Sedekah"), 1000.0);
        assert_eq!(balance(&conn, "Tabungan"), 5000.0);

        let categories: Vec<String> = conn
            .prepare("SELECT DISTINCT category FROM transactions ORDER BY category")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(categories, ["Menabung", "Sedekah"]);
    }

    #[test]
    fn test_general_purpose_has_no_bucket() {
        let (_dir, conn) = test_db();
        let err = to_bucket(&conn, Purpose::General, "BRI", 10.0, None, None);
        assert!(matches!(err, Err(LedgerError::UnknownPurpose(_))));
        assert_eq!(txn_count(&conn), 0);
    }

    #[test]
    fn test_move_between_unknown_account() {
        let (_dir, conn) = test_db();
        let err = move_between(&conn, "BRI", "Mandiri", 10.0, None, None, Purpose::General, None);
        assert!(matches!(err, Err(LedgerError::UnknownAccount(name)) if name == "Mandiri"));
    }

    #[test]
    fn test_move_between_reports_stored_names() {
        let (_dir, conn) = test_db();
        let receipt = move_between(&conn, "bri", "DANA", 5.0, None, None, Purpose::General, None).unwrap();
        assert_eq!((receipt.from.as_str(), receipt.to.as_str()), ("BRI", "Dana"));
        assert_eq!(receipt.debit_id + 1, receipt.credit_id);
    }

    #[test]
    fn test_move_between_rejects_purpose_outside_bucket() {
        let (_dir, conn) = test_db();
        let err = move_between(&conn, "BRI", "Dana", 5.0, None, None, Purpose::Charity, None);
        assert!(matches!(err, Err(LedgerError::PurposeMismatch { .. })));
        assert_eq!(txn_count(&conn), 0);
    }
}
