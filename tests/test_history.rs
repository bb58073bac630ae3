use securepass::history::{
    HistoryBackend, HistoryError, HistoryRecord, HistoryStore, MemoryBackend, SledBackend, SortKey,
    StorageError, ViewState,
};
use tempfile::tempdir;
use uuid::Uuid;

// 创建测试用HistoryStore（内存后端）
fn test_store() -> HistoryStore<MemoryBackend> {
    HistoryStore::open(MemoryBackend::default()).expect("Failed to open history store")
}

fn view(search: &str, sort_key: SortKey, page_number: usize, page_size: usize) -> ViewState {
    ViewState {
        search_text: search.to_string(),
        sort_key,
        page_number,
        page_size,
    }
}

fn passwords(records: &[HistoryRecord]) -> Vec<&str> {
    records.iter().map(|r| r.password.as_str()).collect()
}

#[test]
fn test_insert_prepends_and_persists() {
    let mut store = test_store();
    store.insert("first", 10.0).unwrap();
    store.insert("second", 20.0).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(passwords(store.records()), vec!["second", "first"]);
    assert_eq!(store.backend().records(), store.records());
}

#[test]
fn test_insert_then_query_newest_first() {
    let mut store = test_store();
    store.insert("older-Pass", 30.0).unwrap();
    let record = store.insert("Newer-Pass", 40.0).unwrap();

    let page = store.query(&view("pass", SortKey::Newest, 1, 1));
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0], record);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.total_matches, 2);
}

#[test]
fn test_query_filter_is_case_insensitive_substring() {
    let mut store = test_store();
    store.insert("AbcDEF", 10.0).unwrap();
    store.insert("xyz", 10.0).unwrap();
    store.insert("zzcdezz", 10.0).unwrap();

    let page = store.query(&view("CDE", SortKey::Newest, 1, 10));
    assert_eq!(passwords(&page.records), vec!["zzcdezz", "AbcDEF"]);

    let page = store.query(&view("", SortKey::Newest, 1, 10));
    assert_eq!(page.total_matches, 3);

    let page = store.query(&view("nothing", SortKey::Newest, 1, 10));
    assert!(page.records.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[test]
fn test_query_sort_keys() {
    let mut store = test_store();
    store.insert("aaaa", 50.0).unwrap();
    store.insert("bb", 90.0).unwrap();
    store.insert("cccccc", 10.0).unwrap();

    let order = |key| passwords(&store.query(&view("", key, 1, 10)).records)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    assert_eq!(order(SortKey::Newest), vec!["cccccc", "bb", "aaaa"]);
    assert_eq!(order(SortKey::Oldest), vec!["aaaa", "bb", "cccccc"]);
    assert_eq!(order(SortKey::Strongest), vec!["bb", "aaaa", "cccccc"]);
    assert_eq!(order(SortKey::Weakest), vec!["cccccc", "aaaa", "bb"]);
    assert_eq!(order(SortKey::Longest), vec!["cccccc", "aaaa", "bb"]);
    assert_eq!(order(SortKey::Shortest), vec!["bb", "aaaa", "cccccc"]);
}

#[test]
fn test_query_sort_is_stable() {
    let mut store = test_store();
    store.insert("one", 42.0).unwrap();
    store.insert("two", 42.0).unwrap();
    store.insert("six", 42.0).unwrap();

    // equal entropy and length keep storage order (newest first)
    let page = store.query(&view("", SortKey::Strongest, 1, 10));
    assert_eq!(passwords(&page.records), vec!["six", "two", "one"]);
    let page = store.query(&view("", SortKey::Shortest, 1, 10));
    assert_eq!(passwords(&page.records), vec!["six", "two", "one"]);
}

#[test]
fn test_pagination() {
    let mut store = test_store();
    for i in 0..12 {
        store.insert(format!("pw{:02}", i), i as f64).unwrap();
    }

    let first = store.query(&view("", SortKey::Oldest, 1, 5));
    assert_eq!(passwords(&first.records), vec!["pw00", "pw01", "pw02", "pw03", "pw04"]);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.current_page, 1);
    assert!(!first.has_previous());
    assert!(first.has_next());

    let last = store.query(&view("", SortKey::Oldest, 3, 5));
    assert_eq!(passwords(&last.records), vec!["pw10", "pw11"]);
    assert!(last.has_previous());
    assert!(!last.has_next());

    let beyond = store.query(&view("", SortKey::Oldest, 4, 5));
    assert!(beyond.records.is_empty());
    assert_eq!(beyond.current_page, 4);
    assert_eq!(beyond.total_pages, 3);
}

#[test]
fn test_strongest_is_non_increasing_across_pages() {
    let mut store = test_store();
    let entropies = [12.5, 99.0, 40.0, 40.0, 77.7, 0.0, 63.1, 100.0, 18.8, 55.5, 81.0];
    for (i, e) in entropies.iter().enumerate() {
        store.insert(format!("p{}", i), *e).unwrap();
    }

    let mut seen = Vec::new();
    let mut v = view("", SortKey::Strongest, 1, 3);
    loop {
        let page = store.query(&v);
        seen.extend(page.records.iter().map(|r| r.entropy_bits));
        if !page.has_next() {
            break;
        }
        v.next_page();
    }
    assert_eq!(seen.len(), entropies.len());
    assert!(seen.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_query_is_idempotent() {
    let mut store = test_store();
    store.insert("alpha", 10.0).unwrap();
    store.insert("beta", 70.0).unwrap();
    store.insert("gamma", 30.0).unwrap();

    let v = view("a", SortKey::Weakest, 1, 2);
    let first = store.query(&v);
    let second = store.query(&v);
    assert_eq!(first, second);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_delete_only_record() {
    let mut store = test_store();
    store.insert("lonely", 10.0).unwrap();

    let removed = store.delete_at(&ViewState::default(), 0).unwrap();
    assert_eq!(removed.password, "lonely");

    let page = store.query(&ViewState::default());
    assert!(page.records.is_empty());
    assert_eq!(page.total_pages, 1);
    assert!(store.backend().records().is_empty());
}

#[test]
fn test_delete_at_resolves_view_relative_index() {
    let mut store = test_store();
    store.insert("keep-1", 90.0).unwrap();
    store.insert("drop-me", 10.0).unwrap();
    store.insert("keep-2", 50.0).unwrap();
    store.insert("other", 5.0).unwrap();

    // "keep" filter sorted weakest first: [keep-2, keep-1]
    let v = view("KEEP", SortKey::Weakest, 1, 5);
    let removed = store.delete_at(&v, 1).unwrap();
    assert_eq!(removed.password, "keep-1");
    assert_eq!(passwords(store.records()), vec!["other", "keep-2", "drop-me"]);

    // second page of size 1 is index 0 of that page
    let v = view("", SortKey::Newest, 2, 1);
    let removed = store.delete_at(&v, 0).unwrap();
    assert_eq!(removed.password, "keep-2");
}

#[test]
fn test_delete_at_out_of_range() {
    let mut store = test_store();
    store.insert("a1", 10.0).unwrap();
    store.insert("a2", 10.0).unwrap();

    let result = store.delete_at(&view("", SortKey::Newest, 1, 5), 2);
    assert!(matches!(result, Err(HistoryError::IndexOutOfRange { index: 2, len: 2 })));
    assert_eq!(store.len(), 2);
    assert_eq!(store.backend().records().len(), 2);
}

#[test]
fn test_delete_by_id() {
    let mut store = test_store();
    let a = store.insert("a", 1.0).unwrap();
    let b = store.insert("b", 2.0).unwrap();

    let removed = store.delete(a.id).unwrap();
    assert_eq!(removed, a);
    assert!(store.get(a.id).is_none());
    assert_eq!(store.get(b.id), Some(&b));

    let missing = Uuid::new_v4();
    assert!(matches!(store.delete(missing), Err(HistoryError::RecordNotFound(id)) if id == missing));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_timestamps_strictly_increase() {
    let mut store = test_store();
    for i in 0..50 {
        store.insert(format!("p{}", i), 1.0).unwrap();
    }
    assert!(store.records().windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[test]
fn test_records_have_unique_ids() {
    let mut store = test_store();
    let a = store.insert("same", 1.0).unwrap();
    let b = store.insert("same", 1.0).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_clear() {
    let mut store = test_store();
    store.insert("x", 1.0).unwrap();
    store.insert("y", 2.0).unwrap();
    store.clear().unwrap();
    assert!(store.is_empty());
    assert!(store.backend().records().is_empty());
    assert_eq!(store.query(&ViewState::default()).total_pages, 1);
}

#[test]
fn test_negative_entropy_is_clamped() {
    let mut store = test_store();
    let record = store.insert("x", -3.0).unwrap();
    assert_eq!(record.entropy_bits, 0.0);
}

#[test]
fn test_sled_history_survives_reopen() {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("history");

    let (kept, deleted) = {
        let mut store = HistoryStore::open_path(&db_path).expect("Failed to open sled store");
        store.insert("first-Pw1!", 52.4).unwrap();
        let second = store.insert("second-Pw2!", 72.1).unwrap();
        let third = store.insert("third", 23.5).unwrap();
        store.delete(second.id).unwrap();
        assert_eq!(store.backend().load().unwrap(), store.records());
        (third, second)
    };

    let store = HistoryStore::open(SledBackend::open(&db_path).unwrap()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.records()[0], kept);
    assert!(store.get(deleted.id).is_none());
    assert_eq!(store.records()[1].password, "first-Pw1!");
}

#[test]
fn test_sled_clear_survives_reopen() {
    let dir = tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("history");
    {
        let mut store = HistoryStore::open_path(&db_path).unwrap();
        store.insert("temporary", 10.0).unwrap();
        store.clear().unwrap();
    }
    let store = HistoryStore::open_path(&db_path).unwrap();
    assert!(store.is_empty());
}

// 写入总是失败的后端
struct FailingBackend {
    inner: MemoryBackend,
}

impl HistoryBackend for FailingBackend {
    fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        self.inner.load()
    }

    fn save(&mut self, _records: &[HistoryRecord]) -> Result<(), StorageError> {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        Err(StorageError::Sled(sled::Error::Io(err)))
    }
}

#[test]
fn test_failed_save_leaves_history_unchanged() {
    let mut seeded = test_store();
    let first = seeded.insert("first", 10.0).unwrap();
    seeded.insert("second", 20.0).unwrap();
    let before = seeded.records().to_vec();

    let mut store = HistoryStore::open(FailingBackend { inner: seeded.backend().clone() }).unwrap();
    assert_eq!(store.records(), &before[..]);

    assert!(matches!(store.insert("third", 30.0), Err(HistoryError::Storage(_))));
    assert_eq!(store.records(), &before[..]);

    assert!(matches!(store.delete(first.id), Err(HistoryError::Storage(_))));
    assert_eq!(store.records(), &before[..]);

    assert!(matches!(store.delete_at(&ViewState::default(), 0), Err(HistoryError::Storage(_))));
    assert_eq!(store.records(), &before[..]);

    assert!(matches!(store.clear(), Err(HistoryError::Storage(_))));
    assert_eq!(store.records(), &before[..]);
    assert_eq!(store.backend().inner.records(), &before[..]);
}
