//! Airtime Catalog Server
//!
//! Keeps the persisted catalog, the in-memory catalog and the rotation queue
//! consistent while tracks are looked up, added, imported and played.
//!
//! # Features
//!
//! - Track lookup with a duration ceiling
//! - Add workflow: dedup, download, persist, fast-path enqueue, with rollback
//! - Case-insensitive title search
//! - Playback-driver contract (`next_item`, `mark_played`)
//! - Bulk import of JSON playlists with progress reporting
//!
//! # Architecture
//!
//! - `server`: the `CatalogServer` context owned by the process entry point
//! - `import`: batch variant of the add workflow

mod error;
mod types;

pub mod import;
pub mod server;

pub use error::{AddTrackError, ImportError, LookupTrackError};
pub use import::{load_playlist, BulkImporter};
pub use server::CatalogServer;
pub use types::*;
