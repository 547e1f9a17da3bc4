use pinmap_shared::controller::MapController;
use pinmap_shared::error::{PinError, Result};
use pinmap_shared::models::Pin;
use pinmap_shared::persist::{KeyValueStore, MemoryStore, PinRepository};
use pinmap_shared::store::PinStore;
use pinmap_shared::viewport::Viewport;
use wasm_bindgen::JsValue;

use crate::config;

pub type Controller = MapController<BrowserStore>;

/// Browser `localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// `None` when storage is disabled (private mode, sandboxed iframe).
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

fn js_error(e: JsValue) -> PinError {
    PinError::Storage(format!("{e:?}"))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

/// Where the page keeps its pins: `localStorage` for the user's own map,
/// memory for shared views and when `localStorage` is off.
pub enum BrowserStore {
    Local(LocalStorage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn local_or_memory() -> Self {
        match LocalStorage::open() {
            Some(local) => BrowserStore::Local(local),
            None => {
                tracing::warn!("localStorage unavailable, pins will not survive a reload");
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BrowserStore::Local(_))
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self {
            BrowserStore::Local(s) => s.remove(key),
            BrowserStore::Memory(s) => s.remove(key),
        }
    }
}

fn controller(repo: PinRepository<BrowserStore>) -> Controller {
    MapController::new(
        PinStore::open(repo),
        Viewport::new(config::viewport_config()),
    )
}

/// The user's own map, backed by `localStorage`.
pub fn local_controller() -> Controller {
    controller(PinRepository::new(
        BrowserStore::local_or_memory(),
        config::STORAGE_KEY,
    ))
}

/// A throwaway map holding pins decoded from a share link. Nothing it does
/// reaches `localStorage`.
pub fn shared_controller(pins: &[Pin]) -> Controller {
    let mut repo = PinRepository::new(
        BrowserStore::Memory(MemoryStore::new()),
        config::SHARED_KEY,
    );
    if let Err(e) = repo.save(pins) {
        tracing::warn!(error = %e, "Failed to stage shared pins");
    }
    controller(repo)
}
