//! gram-bazaar/crates/storage-adapters/src/lib.rs
//!
//! Concrete plugins behind the persistence ports: a SQLite store for all
//! repositories and a content-addressed local filesystem media store.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "media-local")]
pub mod media;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;

#[cfg(feature = "media-local")]
pub use media::LocalMediaStore;
