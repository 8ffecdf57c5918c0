//! Item collection engine for a single-user shopping list.
//!
//! The crate is the pure data-transformation core: mutations, the
//! filter/sort/derive pipeline, CSV/JSON codecs and the two collaborator
//! boundaries (persistence, image lookup). Rendering and UI plumbing live
//! in whatever shell embeds this library.

pub mod error;
pub mod export;
pub mod id;
pub mod import;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod mutate;
pub mod query;
pub mod store;
pub mod time;

pub use error::{AppError, AppResult};
pub use import::{import_items, ImportError, ImportReport};
pub use model::{validate_for_save, Attribute, Item, Priority, ValidationError};
pub use mutate::{remove, toggle_purchased, upsert};
pub use query::{derive_view, Filters, Sort, SortDir, SortKey, View};
pub use store::{CollectionStore, JsonFileStore, MemoryStore, STORAGE_KEY};
