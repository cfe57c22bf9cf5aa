use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::reports::counts;
use crate::settings::{load_settings, settings_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", settings.data_path().display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let c = counts(&conn)?;

        println!();
        println!("Accounts:      {}", c.accounts);
        println!("Transactions:  {}", c.transactions);
        println!("Transfers:     {}", c.transfers);
    } else {
        println!();
        println!("Database not found. Run `dompet init` to set up.");
    }

    Ok(())
}
