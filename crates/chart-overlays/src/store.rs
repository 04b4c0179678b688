// File: crates/chart-overlays/src/store.rs
// Summary: Persisted annotation store: drawing records, storage backends and change notifications.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::theme::Rgba;
use crate::tools::shape::{DrawingKind, ShapeStyle};
use crate::types::Point;

/// Key of the persisted drawings blob.
pub const STORAGE_KEY: &str = "drawings-storage";
const BLOB_VERSION: u32 = 0;

/// Kind-specific style fields, tagged by `type`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawingStyle {
    #[serde(rename = "rectangle")]
    Rectangle {
        #[serde(rename = "fillColor")]
        fill_color: Rgba,
        #[serde(rename = "fillOpacity")]
        fill_opacity: f32,
    },
    #[serde(rename = "trendline")]
    TrendLine {
        color: Rgba,
        #[serde(rename = "lineWidth")]
        line_width: f32,
    },
}

impl DrawingStyle {
    pub fn kind(&self) -> DrawingKind {
        match self {
            DrawingStyle::Rectangle { .. } => DrawingKind::Rectangle,
            DrawingStyle::TrendLine { .. } => DrawingKind::TrendLine,
        }
    }

    pub fn from_shape(kind: DrawingKind, style: &ShapeStyle) -> Self {
        match kind {
            DrawingKind::Rectangle => DrawingStyle::Rectangle { fill_color: style.color, fill_opacity: style.opacity },
            DrawingKind::TrendLine => DrawingStyle::TrendLine { color: style.color, line_width: style.line_width },
        }
    }

    /// Fill in what the record does not carry from `fallback`.
    pub fn to_shape(&self, fallback: &ShapeStyle) -> ShapeStyle {
        match *self {
            DrawingStyle::Rectangle { fill_color, fill_opacity } => {
                ShapeStyle { color: fill_color, opacity: fill_opacity, ..*fallback }
            }
            DrawingStyle::TrendLine { color, line_width } => ShapeStyle { color, line_width, ..*fallback },
        }
    }
}

/// A finalized, persisted annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: String,
    pub points: [Point; 2],
    #[serde(flatten)]
    pub style: DrawingStyle,
}

impl Drawing {
    /// New record with a fresh v4 id.
    pub fn new(points: [Point; 2], style: DrawingStyle) -> Self {
        Self { id: Uuid::new_v4().to_string(), points, style }
    }

    pub fn kind(&self) -> DrawingKind { self.style.kind() }
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    drawings: Vec<Drawing>,
}

#[derive(Serialize, Deserialize)]
struct PersistedBlob {
    state: PersistedState,
    version: u32,
}

/// Keyed string storage.
pub trait StorageBackend {
    /// `Ok(None)` when nothing was stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn path_for(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let io = |source, path: &Path| StoreError::Io { path: path.to_path_buf(), source };
        std::fs::create_dir_all(&self.dir).map_err(|e| io(e, &self.dir))?;
        std::fs::write(&path, value).map_err(|e| io(e, &path))
    }
}

/// In-memory storage; clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, key: &str) -> Option<String> { self.entries.borrow().get(key).cloned() }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.to_string(), value.into());
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> { Ok(self.get(key)) }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.insert(key, value);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    Added(Drawing),
    Removed(Drawing),
    Cleared(Vec<Drawing>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type StoreListener = Rc<dyn Fn(&StoreEvent)>;

/// Ordered list of drawings, loaded once and rewritten on every mutation.
///
/// Listeners run after the new state is persisted and may read the store.
pub struct AnnotationStore {
    backend: Box<dyn StorageBackend>,
    key: String,
    drawings: RefCell<Vec<Drawing>>,
    listeners: RefCell<Vec<(ListenerId, StoreListener)>>,
    next_listener: Cell<u64>,
}

impl AnnotationStore {
    pub fn load(backend: impl StorageBackend + 'static) -> Result<Self, StoreError> {
        Self::load_with_key(backend, STORAGE_KEY)
    }

    /// Read the blob under `key`; a missing blob is an empty store.
    pub fn load_with_key(backend: impl StorageBackend + 'static, key: &str) -> Result<Self, StoreError> {
        let drawings = match backend.read(key)? {
            Some(text) => serde_json::from_str::<PersistedBlob>(&text).map_err(StoreError::Corrupt)?.state.drawings,
            None => Vec::new(),
        };
        info!(key, count = drawings.len(), "drawings loaded");
        Ok(Self {
            backend: Box::new(backend),
            key: key.to_string(),
            drawings: RefCell::new(drawings),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        })
    }

    pub fn drawings(&self) -> Vec<Drawing> { self.drawings.borrow().clone() }

    pub fn get(&self, id: &str) -> Option<Drawing> {
        self.drawings.borrow().iter().find(|d| d.id == id).cloned()
    }

    pub fn len(&self) -> usize { self.drawings.borrow().len() }

    pub fn is_empty(&self) -> bool { self.drawings.borrow().is_empty() }

    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }

    pub fn add(&self, drawing: Drawing) -> Result<(), StoreError> {
        let mut next = self.drawings();
        next.push(drawing.clone());
        self.commit(next)?;
        debug!(id = %drawing.id, kind = drawing.kind().as_str(), "drawing stored");
        self.notify(&StoreEvent::Added(drawing));
        Ok(())
    }

    /// Remove by id; unknown ids are a no-op returning `Ok(None)`.
    pub fn remove(&self, id: &str) -> Result<Option<Drawing>, StoreError> {
        self.remove_where(|d| d.id == id)
    }

    /// Remove the first drawing of `kind` with exactly these points.
    pub fn remove_by_points(&self, kind: DrawingKind, points: &[Point; 2]) -> Result<Option<Drawing>, StoreError> {
        self.remove_where(|d| d.kind() == kind && d.points == *points)
    }

    pub fn clear(&self) -> Result<Vec<Drawing>, StoreError> {
        let removed = self.drawings();
        if removed.is_empty() {
            return Ok(removed);
        }
        self.commit(Vec::new())?;
        debug!(count = removed.len(), "drawings cleared");
        self.notify(&StoreEvent::Cleared(removed.clone()));
        Ok(removed)
    }

    fn remove_where(&self, pred: impl Fn(&Drawing) -> bool) -> Result<Option<Drawing>, StoreError> {
        let mut next = self.drawings();
        let Some(pos) = next.iter().position(pred) else {
            return Ok(None);
        };
        let removed = next.remove(pos);
        self.commit(next)?;
        debug!(id = %removed.id, "drawing deleted");
        self.notify(&StoreEvent::Removed(removed.clone()));
        Ok(Some(removed))
    }

    /// Persist `next`, then make it current. The in-memory list is untouched on failure.
    fn commit(&self, next: Vec<Drawing>) -> Result<(), StoreError> {
        let blob = PersistedBlob { state: PersistedState { drawings: next }, version: BLOB_VERSION };
        let text = serde_json::to_string(&blob).map_err(StoreError::Serialize)?;
        self.backend.write(&self.key, &text)?;
        *self.drawings.borrow_mut() = blob.state.drawings;
        Ok(())
    }

    fn notify(&self, event: &StoreEvent) {
        let snapshot: Vec<StoreListener> = self.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in snapshot {
            listener(event);
        }
    }
}
