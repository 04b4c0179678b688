// File: crates/chart-overlays/tests/store.rs
// Purpose: Annotation store persistence layout, backends, failures and change notifications.

use std::cell::RefCell;
use std::rc::Rc;

use chart_overlays::store::{StoreEvent, STORAGE_KEY};
use chart_overlays::{
    AnnotationStore, Drawing, DrawingKind, DrawingStyle, FileStorage, MemoryStorage, Point, Rgba, StorageBackend,
    StoreError,
};

fn rect(t0: i64) -> Drawing {
    Drawing::new(
        [Point::new(t0, 101.5), Point::new(t0 + 300, 99.25)],
        DrawingStyle::Rectangle { fill_color: Rgba::new(76, 175, 80, 0.5), fill_opacity: 0.5 },
    )
}

fn line(t0: i64) -> Drawing {
    Drawing::new(
        [Point::new(t0, 100.0), Point::new(t0 + 600, 104.0)],
        DrawingStyle::TrendLine { color: Rgba::opaque(0x21, 0x96, 0xf3), line_width: 2.0 },
    )
}

fn recorder(store: &AnnotationStore) -> Rc<RefCell<Vec<StoreEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

#[test]
fn missing_blob_loads_empty() {
    let store = AnnotationStore::load(MemoryStorage::new()).expect("load");
    assert!(store.is_empty());
}

#[test]
fn blob_layout_matches_persisted_format() {
    let storage = MemoryStorage::new();
    let store = AnnotationStore::load(storage.clone()).expect("load");
    let d = rect(1_700_000_000);
    store.add(d.clone()).expect("add");

    let text = storage.get(STORAGE_KEY).expect("written");
    let json: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(json["version"], 0);
    let rec = &json["state"]["drawings"][0];
    assert_eq!(rec["id"], d.id.as_str());
    assert_eq!(rec["type"], "rectangle");
    assert_eq!(rec["fillColor"], "rgba(76, 175, 80, 0.5)");
    assert_eq!(rec["fillOpacity"], 0.5);
    assert_eq!(rec["points"][1]["price"], 99.25);
    assert_eq!(rec["points"][0]["time"], 1_700_000_000);
}

#[test]
fn drawings_survive_a_reload() {
    let storage = MemoryStorage::new();
    let store = AnnotationStore::load(storage.clone()).expect("load");
    store.add(rect(10)).expect("add");
    store.add(line(20)).expect("add");

    let reloaded = AnnotationStore::load(storage).expect("reload");
    assert_eq!(reloaded.drawings(), store.drawings());
    assert_eq!(reloaded.drawings()[1].kind(), DrawingKind::TrendLine);
}

#[test]
fn ids_are_unique() {
    assert_ne!(rect(1).id, rect(1).id);
}

#[test]
fn corrupt_blob_is_reported() {
    let storage = MemoryStorage::new();
    storage.insert(STORAGE_KEY, "{ not json");
    assert!(matches!(AnnotationStore::load(storage), Err(StoreError::Corrupt(_))));
}

#[test]
fn hand_written_blob_is_accepted() {
    let storage = MemoryStorage::new();
    storage.insert(
        STORAGE_KEY,
        r##"{"state":{"drawings":[{"id":"a","type":"trendline","points":[{"time":1,"price":2.0},{"time":3,"price":4.5}],"color":"#2196F3","lineWidth":3}]},"version":0}"##,
    );
    let store = AnnotationStore::load(storage).expect("load");
    let d = store.get("a").expect("present");
    assert_eq!(d.style, DrawingStyle::TrendLine { color: Rgba::opaque(0x21, 0x96, 0xf3), line_width: 3.0 });
    assert_eq!(d.points[1], Point::new(3, 4.5));
}

#[test]
fn mutations_notify_in_order() {
    let store = AnnotationStore::load(MemoryStorage::new()).expect("load");
    let events = recorder(&store);
    let a = rect(1);
    let b = line(2);
    store.add(a.clone()).expect("add");
    store.add(b.clone()).expect("add");
    assert_eq!(store.remove(&a.id).expect("remove"), Some(a.clone()));
    assert_eq!(store.clear().expect("clear"), vec![b.clone()]);

    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::Added(a.clone()),
            StoreEvent::Added(b.clone()),
            StoreEvent::Removed(a),
            StoreEvent::Cleared(vec![b]),
        ]
    );
    assert!(store.is_empty());
}

#[test]
fn removing_unknown_id_is_a_silent_no_op() {
    let storage = MemoryStorage::new();
    let store = AnnotationStore::load(storage.clone()).expect("load");
    store.add(rect(1)).expect("add");
    let before = storage.get(STORAGE_KEY);
    let events = recorder(&store);

    assert_eq!(store.remove("nope").expect("no error"), None);
    assert!(events.borrow().is_empty());
    assert_eq!(storage.get(STORAGE_KEY), before);
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_by_points_matches_kind_and_points() {
    let store = AnnotationStore::load(MemoryStorage::new()).expect("load");
    let r = rect(5);
    store.add(r.clone()).expect("add");
    assert_eq!(store.remove_by_points(DrawingKind::TrendLine, &r.points).expect("ok"), None);
    assert_eq!(store.remove_by_points(DrawingKind::Rectangle, &r.points).expect("ok"), Some(r));
}

#[test]
fn listeners_can_read_the_store_and_unsubscribe() {
    let store = Rc::new(AnnotationStore::load(MemoryStorage::new()).expect("load"));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (sink, reader) = (seen.clone(), Rc::downgrade(&store));
    let id = store.subscribe(move |_| {
        if let Some(s) = reader.upgrade() {
            sink.borrow_mut().push(s.len());
        }
    });
    store.add(rect(1)).expect("add");
    store.unsubscribe(id);
    store.add(rect(2)).expect("add");
    assert_eq!(*seen.borrow(), vec![1]);
}

struct ReadOnly;

impl StorageBackend for ReadOnly {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> { Ok(None) }
    fn write(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: key.into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[test]
fn failed_write_leaves_state_and_listeners_untouched() {
    let store = AnnotationStore::load(ReadOnly).expect("load");
    let events = recorder(&store);
    assert!(matches!(store.add(rect(1)), Err(StoreError::Io { .. })));
    assert!(store.is_empty());
    assert!(events.borrow().is_empty());
}

#[test]
fn file_storage_writes_one_json_file_per_key() {
    let dir = std::env::temp_dir().join(format!("chart-overlays-store-{}", uuid::Uuid::new_v4()));
    let backend = FileStorage::new(dir.join("nested"));
    let path = backend.path_for(STORAGE_KEY);

    let store = AnnotationStore::load(backend.clone()).expect("missing file is empty");
    store.add(line(7)).expect("add");
    assert!(path.exists());
    assert!(path.ends_with("drawings-storage.json"));

    let reloaded = AnnotationStore::load(backend).expect("reload");
    assert_eq!(reloaded.drawings(), store.drawings());
    std::fs::remove_dir_all(&dir).ok();
}
