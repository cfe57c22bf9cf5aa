use std::path::PathBuf;

use crate::db::open_ledger;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        // Expand `~` before touching the filesystem; canonicalize once it exists.
        let expanded = PathBuf::from(shellexpand_path(&dir));
        std::fs::create_dir_all(&expanded)?;
        settings.data_dir = shellexpand_path(&expanded.to_string_lossy());
    }
    save_settings(&settings)?;

    let resolved = settings.data_path();
    std::fs::create_dir_all(resolved.join("backups"))?;
    open_ledger(&resolved)?;

    tracing::info!(data_dir = %resolved.display(), "initialized ledger");
    println!("Initialized dompet at {}", resolved.display());
    Ok(())
}
