//! Persistence Adapter: the collection is one atomic value, loaded and
//! saved wholesale against a fixed storage key. The core never touches
//! the storage medium except through [`CollectionStore`].

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::import;
use crate::model::Item;
use crate::time;

/// Storage key inherited from the original web build; kept so a migrated
/// data dir keeps working.
pub const STORAGE_KEY: &str = "purchaseList_plaincss_v1";

const PARTIAL_SUFFIX: &str = ".partial";

/// Boundary contract for loading and saving the whole collection.
///
/// Load failures are never fatal: corrupt or missing data degrades to an
/// empty collection.
pub trait CollectionStore {
    fn load(&self) -> Vec<Item>;
    fn save(&self, items: &[Item]) -> AppResult<()>;
}

/// File-backed store: one pretty JSON document named after
/// [`STORAGE_KEY`], saved atomically (tmp + rename).
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: data_dir.into().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self) -> Vec<Item> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    target: "liste_achats",
                    event = "store_empty",
                    path = %self.path.display(),
                    error = %err,
                );
                return Vec::new();
            }
        };

        // Run the stored document through import normalization so a
        // hand-edited or older file degrades per-field instead of
        // discarding everything.
        match import::import_items(&raw, time::now_ms()) {
            Ok((items, report)) => {
                debug!(
                    target: "liste_achats",
                    event = "store_loaded",
                    items = report.items,
                    minted_ids = report.minted_ids,
                );
                items
            }
            Err(err) => {
                warn!(
                    target: "liste_achats",
                    event = "store_corrupt",
                    path = %self.path.display(),
                    error = %err,
                );
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[Item]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::from(err)
                    .with_context("operation", "create_data_dir")
                    .with_context("path", parent.display().to_string())
            })?;
        }
        let payload = serde_json::to_vec_pretty(items)?;
        write_atomic(&self.path, &payload)
            .map_err(|err| err.with_context("operation", "store_save"))
    }
}

/// In-memory store for tests and embedding without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<Item>>,
}

impl CollectionStore for MemoryStore {
    fn load(&self) -> Vec<Item> {
        self.items.lock().expect("memory store lock").clone()
    }

    fn save(&self, items: &[Item]) -> AppResult<()> {
        *self.items.lock().expect("memory store lock") = items.to_vec();
        Ok(())
    }
}

/// Write via a `.partial` sibling and rename, so a crash mid-write never
/// leaves a truncated document under the real name.
pub(crate) fn write_atomic(path: &Path, payload: &[u8]) -> AppResult<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, payload).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "write_partial")
            .with_context("path", tmp.display().to_string())
    })?;
    fs::rename(&tmp, path).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "rename_partial")
            .with_context("path", path.display().to_string())
    })
}

fn tmp_path(final_path: &Path) -> PathBuf {
    let mut s = OsString::from(final_path.as_os_str());
    s.push(PARTIAL_SUFFIX);
    PathBuf::from(s)
}
