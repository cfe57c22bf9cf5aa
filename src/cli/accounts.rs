use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::rupiah;
use crate::ledger::list_accounts;

pub fn list() -> Result<()> {
    let (_, conn) = super::open()?;
    let accounts = list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Kind", "Balance"]);
    let mut real_total = 0.0;
    for acct in &accounts {
        if !acct.is_virtual {
            real_total += acct.balance;
        }
        table.add_row(vec![
            Cell::new(acct.id),
            Cell::new(&acct.name),
            Cell::new(if acct.is_virtual { "virtual" } else { "real" }),
            Cell::new(rupiah(acct.balance)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total (real)".bold()),
        Cell::new(""),
        Cell::new(rupiah(real_total)).set_alignment(CellAlignment::Right),
    ]);
    println!("Accounts\n{table}");
    Ok(())
}
