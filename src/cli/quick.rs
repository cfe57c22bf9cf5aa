use crate::error::Result;
use crate::fmt::rupiah;
use crate::ledger::{find_account, record_transaction, Posting};
use crate::models::{Purpose, TransactionKind};

use super::record::to_bucket;
use super::QuickCommands;

pub fn run(command: QuickCommands) -> Result<()> {
    let (settings, conn) = super::open()?;
    match command {
        QuickCommands::Kip => {
            let acct = find_account(&conn, &settings.kip_account)?;
            record_transaction(
                &conn,
                &Posting {
                    kind: TransactionKind::Income,
                    account_id: acct.id,
                    amount: settings.kip_amount,
                    category: Some("Pencairan KIP".to_string()),
                    description: Some("Automatic KIP disbursement".to_string()),
                    purpose: Purpose::General,
                    timestamp: None,
                },
            )?;
            println!("KIP disbursement of {} credited to {}", rupiah(settings.kip_amount), acct.name);
        }
        QuickCommands::Sedekah { from } => {
            to_bucket(
                &conn,
                Purpose::Charity,
                &from,
                settings.charity_amount,
                Some("Sedekah via quick action".to_string()),
                None,
            )?;
        }
        QuickCommands::Menabung { from } => {
            to_bucket(
                &conn,
                Purpose::Saving,
                &from,
                settings.saving_amount,
                Some("Menabung via quick action".to_string()),
                None,
            )?;
        }
    }
    Ok(())
}
