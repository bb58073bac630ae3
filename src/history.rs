//  ____  ____     __        __    __  __           _
// |  _ \|  _ \ __ \ \      / /__ |  \/  | __ _ ___| |_ ___ _ __
// | |_) | |_) / _` \ \/\ / / _ \| |\/| |/ _` / __| __/ _ \ '__|
// |  _ <|  __/ (_| |\ V  V / (_) | |  | | (_| \__ \ ||  __/ |
// |_| \_\_|   \__,_| \_/\_/ \___/|_|  |_|\__,_|___/\__\___|_|
//
// Author : Sidney Zhang <zly@lyzhang.me>
// Date : 2025-11-02
// Version : 0.1.0
// License : Mulan PSL v2
//
// Generated password history

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use sled::{Db, Tree};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Deserialize};
use bincode::serde::{encode_to_vec, decode_from_slice};
use bincode::config::standard;
use thiserror::Error;
use log::{debug, info};

pub const DEFAULT_PAGE_SIZE: usize = 5;

// 历史记录条目，创建后不再修改
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub password: String,
    pub entropy_bits: f64,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    fn new(password: String, entropy_bits: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            password,
            entropy_bits: entropy_bits.max(0.0),
            created_at,
        }
    }

    pub fn length(&self) -> usize {
        self.password.chars().count()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Failed to encode history: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode history: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Index {index} is out of range for a view of {len} records")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("No history record with id {0}")]
    RecordNotFound(Uuid),
    #[error("History storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Durable home of the full history. The store only ever reads or
/// replaces the whole sequence.
pub trait HistoryBackend {
    fn load(&self) -> Result<Vec<HistoryRecord>, StorageError>;
    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), StorageError>;
}

/// Keeps the history in a single key of a sled tree.
pub struct SledBackend {
    _db: Db,
    tree: Tree,
}

impl SledBackend {
    const HISTORY_TREE: &'static str = "history";
    const RECORDS_KEY: &'static [u8] = b"records";

    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let db = sled::open(db_path)?;
        let tree = db.open_tree(Self::HISTORY_TREE)?;
        Ok(SledBackend { _db: db, tree })
    }
}

impl HistoryBackend for SledBackend {
    fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        match self.tree.get(Self::RECORDS_KEY)? {
            Some(bytes) => Ok(decode_from_slice(&bytes, standard())?.0),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), StorageError> {
        let serialized = encode_to_vec(records, standard())?;
        self.tree.insert(Self::RECORDS_KEY, serialized)?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-process backend, nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Vec<HistoryRecord>,
}

impl MemoryBackend {
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), StorageError> {
        self.records = records.to_vec();
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Strongest,
    Weakest,
    Longest,
    Shortest,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::Strongest,
        SortKey::Weakest,
        SortKey::Longest,
        SortKey::Shortest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Strongest => "strongest",
            SortKey::Weakest => "weakest",
            SortKey::Longest => "longest",
            SortKey::Shortest => "shortest",
        }
    }

    fn sort(&self, records: &mut [&HistoryRecord]) {
        // sort_by is stable, ties keep the prior order
        match self {
            SortKey::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::Oldest => records.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortKey::Strongest => records.sort_by(|a, b| b.entropy_bits.total_cmp(&a.entropy_bits)),
            SortKey::Weakest => records.sort_by(|a, b| a.entropy_bits.total_cmp(&b.entropy_bits)),
            SortKey::Longest => records.sort_by(|a, b| b.length().cmp(&a.length())),
            SortKey::Shortest => records.sort_by(|a, b| a.length().cmp(&b.length())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let keys: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("Unknown sort key '{}'. Expected one of: {}", s, keys.join(", "))
            })
    }
}

/// Search, sort and page selection for one look at the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_text: String,
    pub sort_key: SortKey,
    pub page_number: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort_key: SortKey::Newest,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    /// A new filter invalidates the old pagination.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page_number = 1;
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    pub fn next_page(&mut self) {
        self.page_number += 1;
    }

    pub fn previous_page(&mut self) {
        if self.page_number > 1 {
            self.page_number -= 1;
        }
    }

    fn page(&self) -> usize {
        self.page_number.max(1)
    }

    fn size(&self) -> usize {
        self.page_size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total_matches: usize,
}

impl HistoryPage {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Generated passwords, newest first. Every mutation rewrites the whole
/// sequence to the backend before it becomes visible in memory.
pub struct HistoryStore<B: HistoryBackend> {
    records: Vec<HistoryRecord>,
    backend: B,
}

impl HistoryStore<SledBackend> {
    pub fn open_path<P: AsRef<Path>>(db_path: P) -> Result<Self, HistoryError> {
        let backend = SledBackend::open(db_path)?;
        Self::open(backend)
    }
}

impl<B: HistoryBackend> HistoryStore<B> {
    pub fn open(backend: B) -> Result<Self, HistoryError> {
        let records = backend.load()?;
        debug!("Loaded {} history records", records.len());
        Ok(HistoryStore { records, backend })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 新记录插入最前
    pub fn insert(
        &mut self,
        password: impl Into<String>,
        entropy_bits: f64,
    ) -> Result<HistoryRecord, HistoryError> {
        let record = HistoryRecord::new(password.into(), entropy_bits, self.next_timestamp());
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend_from_slice(&self.records);
        self.commit(next)?;
        info!("Recorded password {} in history", record.id);
        Ok(record)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<HistoryRecord, HistoryError> {
        let pos = self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(HistoryError::RecordNotFound(id))?;
        let mut next = self.records.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        info!("Deleted history record {}", id);
        Ok(removed)
    }

    /// Deletes the `index`-th record of the page `query(view)` returns.
    pub fn delete_at(&mut self, view: &ViewState, index: usize) -> Result<HistoryRecord, HistoryError> {
        let page = self.query(view);
        let id = page.records
            .get(index)
            .map(|r| r.id)
            .ok_or(HistoryError::IndexOutOfRange { index, len: page.records.len() })?;
        self.delete(id)
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        let removed = self.records.len();
        self.commit(Vec::new())?;
        info!("Cleared {} history records", removed);
        Ok(())
    }

    pub fn query(&self, view: &ViewState) -> HistoryPage {
        let needle = view.search_text.to_lowercase();
        let mut matches: Vec<&HistoryRecord> = self.records
            .iter()
            .filter(|r| r.password.to_lowercase().contains(&needle))
            .collect();
        view.sort_key.sort(&mut matches);

        let page_size = view.size();
        let current_page = view.page();
        let total_matches = matches.len();
        let total_pages = total_matches.div_ceil(page_size).max(1);

        let records = matches
            .into_iter()
            .skip((current_page - 1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        HistoryPage {
            records,
            total_pages,
            current_page,
            total_matches,
        }
    }

    // 时间戳严格递增，保证 newest/oldest 排序与插入顺序一致
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.records.first() {
            Some(latest) if now <= latest.created_at => latest.created_at + Duration::nanoseconds(1),
            _ => now,
        }
    }

    fn commit(&mut self, next: Vec<HistoryRecord>) -> Result<(), HistoryError> {
        self.backend.save(&next)?;
        self.records = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("Strongest".parse::<SortKey>().unwrap(), SortKey::Strongest);
        assert_eq!(" oldest ".parse::<SortKey>().unwrap(), SortKey::Oldest);
        assert!("random".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_view_state_search_resets_page() {
        let mut view = ViewState::default();
        view.next_page();
        view.next_page();
        assert_eq!(view.page_number, 3);
        view.set_search("abc");
        assert_eq!(view.page_number, 1);
        view.previous_page();
        assert_eq!(view.page_number, 1);
    }

    #[test]
    fn test_zero_page_number_and_size_are_clamped() {
        let mut store = HistoryStore::open(MemoryBackend::default()).unwrap();
        store.insert("abc", 10.0).unwrap();
        let view = ViewState {
            page_number: 0,
            page_size: 0,
            ..Default::default()
        };
        let page = store.query(&view);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_pages, 1);
    }
}
