//! Airtime Core
//!
//! Platform-agnostic types, capability traits, and error handling shared by
//! every Airtime crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `Source`, `PreparedItem`
//! - **Capabilities**: `Resolver` (metadata lookup + source resolution),
//!   `Downloader` (audio materialization) and `CatalogStore` (persistence)
//! - **Error Handling**: `AirtimeError`, `LookupError`, `DownloadError`
//!
//! Nothing in here talks to the network or a database; concrete
//! implementations live in `airtime-storage` and the daemon.
//!
//! # Example
//!
//! ```rust
//! use airtime_core::types::{Track, TrackId};
//!
//! let track = Track::new("dQw4w9WgXcQ", "Never Gonna Give You Up")
//!     .with_duration(213);
//!
//! assert_eq!(track.id, TrackId::new("dQw4w9WgXcQ"));
//! assert!(!track.has_played());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

pub use error::{AirtimeError, DownloadError, LookupError, Result};
pub use storage::CatalogStore;
pub use traits::{Downloader, Resolver};
pub use types::{PreparedItem, Source, Track, TrackId};
