use anyhow::{anyhow, Context, Result};
use securepass::configtool::{prompt_input, AppConfig};

use super::open_store;

pub fn clear_history(config: &AppConfig, yes: bool) -> Result<()> {
    if !yes {
        let response = prompt_input("Clear all password history? [y/N]: ").map_err(|e| anyhow!(e))?;
        if !response.eq_ignore_ascii_case("y") {
            println!("History kept.");
            return Ok(());
        }
    }

    let mut store = open_store(config)?;
    let count = store.len();
    store.clear().context("Failed to clear history")?;
    println!("History cleared ({} records removed).", count);
    Ok(())
}
