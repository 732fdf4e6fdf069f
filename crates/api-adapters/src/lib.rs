//! # api-adapters
//!
//! Transport layer for Gram-Bazaar. Each web stack lives behind its own
//! feature so the binary picks exactly one; `web-axum` is the only one
//! shipped today.

#[cfg(feature = "web-axum")]
pub mod web;
