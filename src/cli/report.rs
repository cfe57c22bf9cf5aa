use chrono::Datelike;
use colored::{ColoredString, Colorize};
use comfy_table::{Cell, CellAlignment, Table};

use crate::calendar::{daily_series, month_grid, parse_date, parse_month_opt};
use crate::error::{LedgerError, Result};
use crate::fmt::rupiah;
use crate::ledger::verify_balances;
use crate::models::{Purpose, TransactionKind};
use crate::reports::{self, Heat};

fn amount_cell(amount: f64) -> Cell {
    Cell::new(rupiah(amount)).set_alignment(CellAlignment::Right)
}

pub fn history(limit: Option<usize>) -> Result<()> {
    let (settings, conn) = super::open()?;
    let rows = reports::recent_transactions(&conn, limit.unwrap_or(settings.recent_limit))?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Time", "Type", "Account", "Amount", "Category", "Description", "Purpose", "Transfer",
    ]);
    for t in &rows {
        let kind = match t.kind {
            TransactionKind::Income => t.kind.as_str().green(),
            TransactionKind::Expense => t.kind.as_str().red(),
        };
        let purpose = match t.purpose {
            Purpose::General => String::new(),
            p => p.to_string(),
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.timestamp),
            Cell::new(kind),
            Cell::new(&t.account_name),
            amount_cell(t.amount),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(t.description.as_deref().unwrap_or("")),
            Cell::new(purpose),
            Cell::new(if t.is_transfer_leg() {
                t.transfer_id.map(|id| format!("#{id}")).unwrap_or_default()
            } else {
                String::new()
            }),
        ]);
    }
    println!("Recent Transactions\n{table}");
    Ok(())
}

pub fn summary(month: Option<String>) -> Result<()> {
    let ym = parse_month_opt(month.as_deref())?;
    let (_, conn) = super::open()?;
    let days = reports::daily_summary(&conn, ym.year, ym.month)?;

    let mut table = Table::new();
    table.set_header(vec!["Day", "Income", "Expense"]);
    let (mut income, mut expense) = (0.0, 0.0);
    for d in daily_series(ym, &days) {
        income += d.income;
        expense += d.expense;
        table.add_row(vec![Cell::new(d.day), amount_cell(d.income), amount_cell(d.expense)]);
    }
    table.add_row(vec![Cell::new("Total".bold()), amount_cell(income), amount_cell(expense)]);
    println!("Daily Summary: {}\n{table}", ym.title());
    Ok(())
}

pub fn activity(date: Option<String>) -> Result<()> {
    let day = match date {
        Some(d) => parse_date(&d)?,
        None => chrono::Local::now().date_naive(),
    };
    let (_, conn) = super::open()?;
    let flags = reports::activity_for_date(&conn, day)?;

    let yes_no = |b: bool| if b { "yes".green() } else { "no".dimmed() };
    println!("Activity on {}", day.format("%Y-%m-%d"));
    println!("  Sedekah:      {}", yes_no(flags.charity));
    println!("  Menabung:     {}", yes_no(flags.saving));
    println!("  Any activity: {}", yes_no(flags.any));
    let heat = flags.heat();
    println!("  Heat:         {}", paint(heat.label().to_string(), heat));
    Ok(())
}

fn paint(text: String, heat: Heat) -> ColoredString {
    match heat {
        Heat::None => text.normal(),
        Heat::Activity => text.black().on_red(),
        Heat::Saving => text.black().on_yellow(),
        Heat::Charity => text.white().on_blue(),
        Heat::Both => text.black().on_green(),
    }
}

pub fn calendar(month: Option<String>) -> Result<()> {
    let ym = parse_month_opt(month.as_deref())?;
    let (_, conn) = super::open()?;

    println!("{}", ym.title().bold());
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");
    for week in month_grid(ym) {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(date) => {
                    let heat = reports::activity_for_date(&conn, date)?.heat();
                    line.push(' ');
                    line.push_str(&paint(format!("{:>2}", date.day()), heat).to_string());
                    line.push(' ');
                }
                None => line.push_str("    "),
            }
        }
        println!("{line}");
    }
    println!(
        "\n {} both  {} sedekah  {} menabung  {} other",
        paint("  ".to_string(), Heat::Both),
        paint("  ".to_string(), Heat::Charity),
        paint("  ".to_string(), Heat::Saving),
        paint("  ".to_string(), Heat::Activity),
    );
    Ok(())
}

pub fn check() -> Result<()> {
    let (_, conn) = super::open()?;
    let drift = verify_balances(&conn)?;
    if drift.is_empty() {
        println!("{}", "All balances match their transactions.".green());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Stored", "From transactions", "Difference"]);
    for d in &drift {
        table.add_row(vec![
            Cell::new(&d.account),
            amount_cell(d.stored),
            amount_cell(d.computed),
            amount_cell(d.stored - d.computed),
        ]);
    }
    println!("{}\n{table}", "Balance drift detected".red().bold());
    Err(LedgerError::BalanceDrift(drift.len()))
}
