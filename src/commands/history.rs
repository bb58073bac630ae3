use anyhow::Result;
use securepass::configtool::AppConfig;
use securepass::history::ViewState;

use super::{open_store, print_record_line};

pub fn show_history(config: &AppConfig, view: &ViewState) -> Result<()> {
    let store = open_store(config)?;
    let page = store.query(view);

    if page.records.is_empty() {
        println!("No passwords found");
    } else {
        for (i, record) in page.records.iter().enumerate() {
            print_record_line(i, record);
        }
    }

    println!("{}", "-".repeat(60));
    println!(
        "Page {} of {} ({} matching, sorted by {})",
        page.current_page, page.total_pages, page.total_matches, view.sort_key
    );
    Ok(())
}
