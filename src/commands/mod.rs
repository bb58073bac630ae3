pub mod clear;
pub mod delete;
pub mod history;
pub mod password_gen;
pub mod testpass;

use anyhow::{Context, Result};
use securepass::configtool::AppConfig;
use securepass::history::{HistoryRecord, HistoryStore, SledBackend};
use securepass::strength::{classify, StrengthTier};

pub fn open_store(config: &AppConfig) -> Result<HistoryStore<SledBackend>> {
    HistoryStore::open_path(&config.history_path)
        .with_context(|| format!("Failed to open history at {}", config.history_path.display()))
}

/// `[###--] Good`
pub fn strength_meter(tier: StrengthTier) -> String {
    let filled = tier.segments() as usize;
    format!("[{}{}] {}", "#".repeat(filled), "-".repeat(5 - filled), tier)
}

pub fn print_record_line(position: usize, record: &HistoryRecord) {
    let tier = classify(record.entropy_bits);
    println!(
        "{:>3}. {:<32} | {:>6.1} bits | {:<11} | {} | {}",
        position,
        record.password,
        record.entropy_bits,
        tier.label(),
        record.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
        record.id
    );
}
