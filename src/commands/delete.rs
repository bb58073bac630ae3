use anyhow::{bail, Context, Result};
use securepass::configtool::AppConfig;
use securepass::history::ViewState;
use uuid::Uuid;

use super::open_store;

pub fn delete_record(
    config: &AppConfig,
    id: Option<Uuid>,
    index: Option<usize>,
    view: &ViewState,
) -> Result<()> {
    let mut store = open_store(config)?;
    let removed = match (id, index) {
        (Some(id), _) => store.delete(id),
        (None, Some(index)) => store.delete_at(view, index),
        (None, None) => bail!("Either --id or --index is required"),
    }
    .context("Failed to delete password")?;

    println!("Password {} deleted successfully.", removed.id);
    Ok(())
}
