//! gram-bazaar/crates/domains/src/lib.rs
//!
//! The central domain models, port traits, and error taxonomy for
//! Gram-Bazaar. Everything here is I/O-free; adapters implement the ports.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
